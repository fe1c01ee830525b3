/// This demo draws a Voronoi diagram, and with `--frames` every step of the sweep
use clap::Parser;
use fortune_rs::{
    events::{CircleEvent, Event},
    BoundingBox, Builder, Context, Diagram, Float, Observer, Point, SiteId, VertexId,
};
use rand::Rng;
use svg::{
    node::element::{Circle, Line},
    Document, Node,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// file with one `x y` pair per line, random points when missing
    #[arg(short, long)]
    path: Option<std::path::PathBuf>,

    #[arg(short, long, default_value = "voronoi.svg")]
    output: std::path::PathBuf,

    /// number of random points
    #[arg(short, long, default_value = "100")]
    count: usize,

    /// directory to write one svg per event into
    #[arg(long)]
    frames: Option<std::path::PathBuf>,

    #[arg(long, default_value = "1000")]
    frame_count: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let points = match &args.path {
        Some(path) => parse_points(&std::fs::read_to_string(path).unwrap()),
        None => {
            let mut rng = rand::thread_rng();
            (0..args.count)
                .map(|_| Point::new(rng.gen_range(0.0..800.), rng.gen_range(0.0..800.)))
                .collect()
        }
    };
    let builder = Builder::new(points);

    let diagram = match &args.frames {
        Some(dir) => {
            let mut observer = DrawObserver::new(args.frame_count);
            let diagram = builder
                .clone()
                .build()
                .unwrap()
                .compute_with_observer(&mut observer)
                .unwrap();
            observer.save(dir);
            diagram
        }
        None => builder.clone().build().unwrap().compute().unwrap(),
    };
    println!("{:?}", diagram.stats());
    draw_svg(&diagram, &args.output);

    // measure time with dummy observer
    let start = std::time::Instant::now();
    let count = 100;
    for _ in 0..count {
        let _ = builder.clone().build().unwrap().compute();
    }
    let duration = start.elapsed() / count;
    println!("{:?} per sweep", duration);
}

fn parse_points(serialized: &str) -> Vec<Point> {
    serialized
        .lines()
        .filter_map(|line| {
            let mut iter = line.split_whitespace();
            let x = iter.next()?.parse::<Float>().ok()?;
            let y = iter.next()?.parse::<Float>().ok()?;
            Some(Point::new(x, y))
        })
        .collect()
}

/// Map into svg space, y flipped since svg's origin is at left-top
struct Map {
    from: BoundingBox,
    size: Float,
}

impl Map {
    fn new<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let bbox = BoundingBox::from_points(points)
            .unwrap_or(BoundingBox::new(Point::new(0., 0.), Point::new(1., 1.)));
        let space = bbox.width().max(bbox.height()).max(1.) * 0.1;
        Self {
            from: bbox.expand(space),
            size: 800.,
        }
    }

    fn point(&self, p: Point) -> (Float, Float) {
        let scale = self.size / self.from.width().max(self.from.height());
        (
            (p.x - self.from.min.x) * scale,
            self.size - (p.y - self.from.min.y) * scale,
        )
    }

    fn scale(&self, length: Float) -> Float {
        length * self.size / self.from.width().max(self.from.height())
    }
}

fn line(map: &Map, a: Point, b: Point, color: &str) -> Line {
    let (a, b) = (map.point(a), map.point(b));
    Line::new()
        .set("x1", a.0)
        .set("y1", a.1)
        .set("x2", b.0)
        .set("y2", b.1)
        .set("stroke", color)
        .set("stroke-width", 1)
}

fn dot(map: &Map, p: Point, r: Float, color: &str) -> Circle {
    let (x, y) = map.point(p);
    Circle::new()
        .set("cx", x)
        .set("cy", y)
        .set("r", r)
        .set("fill", color)
}

fn document(map: &Map) -> Document {
    Document::new()
        .set("viewBox", (0., 0., map.size, map.size))
        .set("style", "background-color: #F5F5F5")
}

fn draw_svg(diagram: &Diagram, path: &std::path::Path) {
    let map = Map::new(diagram.sites().iter().map(|(_, p)| p));
    let mut doc = document(&map);

    for [a, b] in diagram.clip(&map.from) {
        doc.append(line(&map, a, b, "#29B6F6"));
    }
    for (_, p) in diagram.vertices() {
        doc.append(dot(&map, p, 1.5, "#0277BD"));
    }
    for (_, p) in diagram.sites().iter() {
        doc.append(dot(&map, *p, 2., "red"));
    }
    svg::save(path, &doc).unwrap();
}

struct DrawObserver {
    frame_count: usize,
    frames: Vec<Document>,
}

impl DrawObserver {
    fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            frames: vec![],
        }
    }

    fn save(&self, dir: &std::path::Path) {
        std::fs::create_dir_all(dir).unwrap();
        for (idx, frame) in self.frames.iter().enumerate() {
            svg::save(dir.join(format!("frame_{idx:05}.svg")), frame).unwrap();
        }
    }

    fn draw(&mut self, context: &Context) {
        if self.frames.len() >= self.frame_count {
            return;
        }
        let map = Map::new(context.sites.iter().map(|(_, p)| p));
        let mut doc = document(&map);

        // finished edges only, the open ones are still growing
        let dcel = &context.dcel;
        for (id, edge) in dcel.half_edges() {
            if id > edge.twin {
                continue;
            }
            let a = dcel.origin(id).and_then(|v| dcel.position(v));
            let b = dcel.destination(id).and_then(|v| dcel.position(v));
            if let (Some(a), Some(b)) = (a, b) {
                doc.append(line(&map, a, b, "#29B6F6"));
            }
        }

        for event in context.queue.iter() {
            if let Event::Circle(circle) = event {
                let (x, y) = map.point(circle.center);
                let r = map.scale(circle.center.y - circle.lowest.y);
                doc.append(
                    Circle::new()
                        .set("cx", x)
                        .set("cy", y)
                        .set("r", r)
                        .set("fill", "none")
                        .set("stroke", "gray"),
                );
            }
        }

        for (_, p) in context.sites.iter() {
            let color = if p.y >= context.sweep_y { "red" } else { "black" };
            doc.append(dot(&map, *p, 2., color));
        }

        let sweep_y = context.sweep_y.max(map.from.min.y);
        doc.append(line(
            &map,
            Point::new(map.from.min.x, sweep_y),
            Point::new(map.from.max.x, sweep_y),
            "green",
        ));
        self.frames.push(doc);
    }
}

impl Observer for DrawObserver {
    fn site_event(&mut self, _site: SiteId, context: &Context) {
        self.draw(context);
    }

    fn circle_event(&mut self, _event: &CircleEvent, _vertex: VertexId, context: &Context) {
        self.draw(context);
    }

    fn sweep_done(&mut self, context: &Context) {
        self.draw(context);
    }
}

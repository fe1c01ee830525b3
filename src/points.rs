use std::cmp::Ordering;

use crate::{shape::Point, Error};

/// Type alias to the underlying type for SiteId.
/// The same width is used by every arena in the crate, so the number of
/// sites is capped well below `u32::MAX` to leave room for edges and tree nodes.
type NumType = u32;

/// Most sites accepted by one computation
pub const MAX_SITES: usize = (NumType::MAX / 8) as usize;

/// new type for site id, the index of a distinct site in [`Sites`]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SiteId(pub(crate) NumType);

impl SiteId {
    /// Get the inner value as usize
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Order in which the sweep meets two points: higher y first, then smaller x.
pub(crate) fn sweep_order(a: &Point, b: &Point) -> Ordering {
    b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x))
}

/// Site store.
///
/// Input points are validated, exact duplicates are merged into the first
/// occurrence (in input order), and the distinct sites are kept in sweep order.
#[derive(Clone, Debug)]
pub struct Sites {
    points: Vec<Point>,
    /// input index -> site
    input: Vec<SiteId>,
    /// duplicates dropped while building
    merged: usize,
}

impl Sites {
    pub fn new(input_points: Vec<Point>) -> Result<Self, Error> {
        if input_points.len() > MAX_SITES {
            return Err(Error::TooManySites {
                count: input_points.len(),
            });
        }
        if let Some(index) = input_points.iter().position(|p| !p.is_finite()) {
            return Err(Error::NonFiniteSite { index });
        }

        // + 0. folds -0. into 0., so total_cmp sees them as equal
        let input_points = input_points
            .into_iter()
            .map(|p| Point::new(p.x + 0., p.y + 0.))
            .collect::<Vec<_>>();

        // stable sort keeps the input order among duplicates
        let mut order = (0..input_points.len()).collect::<Vec<_>>();
        order.sort_by(|a, b| sweep_order(&input_points[*a], &input_points[*b]));

        let mut points = Vec::<Point>::with_capacity(order.len());
        let mut input = vec![SiteId(0); input_points.len()];
        let mut merged = 0;
        for index in order {
            let point = input_points[index];
            if points.last() == Some(&point) {
                merged += 1;
                log::warn!("site {index} at ({}, {}) is a duplicate, merged", point.x, point.y);
            } else {
                points.push(point);
            }
            input[index] = SiteId((points.len() - 1) as NumType);
        }

        Ok(Self {
            points,
            input,
            merged,
        })
    }

    /// number of distinct sites
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// number of duplicates merged away
    pub fn merged(&self) -> usize {
        self.merged
    }

    pub fn get(&self, site: SiteId) -> Option<Point> {
        self.points.get(site.as_usize()).copied()
    }

    /// helper used in the crate when the `SiteId` came from this store
    pub(crate) fn point(&self, site: SiteId) -> Point {
        self.points[site.as_usize()]
    }

    /// Site that input point `index` ended up as
    pub fn site_of_input(&self, index: usize) -> Option<SiteId> {
        self.input.get(index).copied()
    }

    /// iter all sites, in sweep order
    pub fn iter(&self) -> impl Iterator<Item = (SiteId, &Point)> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, p)| (SiteId(idx as NumType), p))
    }
}

//! Reprojection to longitude/latitude and per-feature bounding boxes.

use anyhow::{Context, Result, anyhow};
use geo::{Centroid, Point};
use tracing::info;

use crate::{
    feature::{Feature, FeatureCollection},
    geom::{BoundingBox, Crs, Reprojector},
};

/// Features in WGS84 lon/lat, each carrying its bounding box, plus the
/// collection center used for the initial map view.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedCollection {
    features: FeatureCollection,
    center: Option<Point<f64>>,
}

impl IndexedCollection {
    #[inline] pub fn features(&self) -> &FeatureCollection { &self.features }

    /// Mean of the per-feature centroids (not area weighted). `None` when empty.
    #[inline] pub fn center(&self) -> Option<Point<f64>> { self.center }

    /// Union of all feature boxes.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.features.iter()
            .filter_map(Feature::bbox)
            .copied()
            .reduce(|a, b| a.union(&b))
    }
}

/// Reproject every feature to lon/lat and attach its bounding box.
/// Fails if the collection has no declared CRS.
pub fn index(collection: FeatureCollection) -> Result<IndexedCollection> {
    let (crs, features) = collection.into_parts();
    let crs = crs.ok_or_else(|| anyhow!(
        "[spatial] source coordinate system is undeclared; add a .prj sidecar or set `crs`"))?;
    let reprojector = Reprojector::to_wgs84(&crs)
        .with_context(|| format!("[spatial] cannot reproject from {crs}"))?;

    let features = features.into_iter()
        .enumerate()
        .map(|(i, feature)| {
            let geometry = reprojector.reproject(feature.geometry())
                .with_context(|| format!("[spatial] failed to reproject feature {i}"))?;
            let bbox = BoundingBox::of(&geometry)
                .ok_or_else(|| anyhow!("[spatial] feature {i} has an empty geometry"))?;
            Ok(feature.with_geographic(geometry, bbox))
        })
        .collect::<Result<Vec<_>>>()?;

    let center = mean_centroid(&features);
    info!(features = features.len(), source = %crs, center = ?center.map(|c| (c.x(), c.y())), "[spatial] indexed features");

    Ok(IndexedCollection { features: FeatureCollection::new(Some(Crs::WGS84), features), center })
}

/// Mean of per-feature centroids, adequate for the modest feature counts a web map holds.
fn mean_centroid(features: &[Feature]) -> Option<Point<f64>> {
    let centroids: Vec<Point<f64>> = features.iter()
        .filter_map(|feature| feature.geometry().centroid())
        .collect();
    if centroids.is_empty() { return None }

    let n = centroids.len() as f64;
    let (x, y) = centroids.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x(), y + p.y()));
    Some(Point::new(x / n, y / n))
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, LineString, Polygon};

    use super::*;
    use crate::feature::Attributes;

    fn square(x: f64, y: f64, size: f64) -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size), (x, y)]),
            vec![],
        ))
    }

    fn collection(crs: Option<Crs>, geometries: Vec<Geometry<f64>>) -> FeatureCollection {
        FeatureCollection::new(crs, geometries.into_iter().map(|g| Feature::new(g, Attributes::new())).collect())
    }

    #[test]
    fn geographic_boxes_are_minimal() {
        let indexed = index(collection(Some(Crs::WGS84), vec![square(85.0, 27.0, 1.0)])).unwrap();
        let bbox = indexed.features().features()[0].bbox().unwrap();
        let expected = [85.0, 27.0, 86.0, 28.0];
        for (got, want) in bbox.to_array().iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn utm_input_lands_in_lonlat_ranges() {
        let indexed = index(collection(
            Some(Crs::Epsg(32645)),
            vec![square(450_000.0, 3_000_000.0, 10_000.0), square(520_000.0, 3_050_000.0, 5_000.0)],
        )).unwrap();

        for feature in indexed.features() {
            let bbox = feature.bbox().unwrap();
            assert!(bbox.is_geographic(), "{bbox:?}");
            assert!(bbox.min_x() <= bbox.max_x() && bbox.min_y() <= bbox.max_y());
        }
        assert_eq!(indexed.features().crs(), Some(&Crs::WGS84));
    }

    #[test]
    fn center_is_mean_of_centroids() {
        let indexed = index(collection(Some(Crs::WGS84), vec![square(0.0, 0.0, 2.0), square(10.0, 4.0, 2.0)])).unwrap();
        let center = indexed.center().unwrap();
        assert!((center.x() - 6.0).abs() < 1e-9);
        assert!((center.y() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_collection_has_no_center() {
        let indexed = index(collection(Some(Crs::WGS84), vec![])).unwrap();
        assert!(indexed.center().is_none());
        assert!(indexed.bounds().is_none());
    }

    #[test]
    fn undeclared_crs_is_fatal() {
        let err = index(collection(None, vec![square(0.0, 0.0, 1.0)])).unwrap_err();
        assert!(err.to_string().contains("undeclared"));
    }
}

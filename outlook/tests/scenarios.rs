use std::{collections::HashMap, sync::Arc};

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use outlook::{
    construct::{construct, Candidate},
    contour,
    resolve::resolve,
    segment::split_polylines,
    Category, ConstructionConfig, Coordinate, Error, Outline, Outlook, ParseConfig, Product,
    ProductKind, ResolveConfig, RiskLevel,
};
use planar::{Point, Polygon, Region, Ring};
use proptest::prelude::*;

/// A box from 105W to 85W and 30N to 45N.
const OUTLINE: &str = r#"{"exterior": [[-105, 30], [-85, 30], [-85, 45], [-105, 45]]}"#;

fn outline() -> Arc<Outline> {
    Arc::new(Outline::from_json(OUTLINE).unwrap())
}

const BULLETIN: &str = "
ZCZC SPCSWODY1 ALL
ACUS01 KWNS 161259
SPC AC 161259

DAY 1 CONVECTIVE OUTLOOK
NWS STORM PREDICTION CENTER NORMAN OK
0759 AM CDT SAT APR 16 2016

VALID 161300Z - 171200Z

... CATEGORICAL ...

SLGT   35009500 40009500 40009000 35009000 35009500
TSTM   30009500 45009500

&&

... TORNADO ...

0.02   35009500 40009500 40009000 35009000 35009500
TSTM   36009400 39009400 39009100 36009100 36009400

&&
";

fn slgt() -> RiskLevel {
    RiskLevel::Category(Category::Slgt)
}

fn parse_product(text: &str) -> Product {
    Product::parse("categorical", text, &outline(), &ParseConfig::default())
}

#[test]
fn closed_polyline_inside() {
    let product = parse_product("SLGT   35009500 40009500 40009000 35009000 35009500");
    let regions = product.regions(slgt());
    assert_eq!(regions.len(), 1);
    let expected = Polygon::new(
        Ring::new(vec![
            Point::new(-95.0, 35.0),
            Point::new(-90.0, 35.0),
            Point::new(-90.0, 40.0),
            Point::new(-95.0, 40.0),
        ]),
        vec![],
    );
    assert_eq!(regions[0].area(), expected.area());
    let diff = planar::boolean_op(
        &Region::from(regions[0].clone()),
        &Region::from(expected),
        planar::FillRule::NonZero,
        planar::BooleanOp::Xor,
    )
    .unwrap();
    assert_eq!(diff.area(), 0.0);
}

#[test]
fn identical_polylines_give_one_region() {
    let product = parse_product(
        "SLGT   35009500 40009500 40009000 35009000 35009500 99999999 \
         35009500 40009500 40009000 35009000 35009500",
    );
    assert_eq!(product.regions(slgt()).len(), 1);
    assert_eq!(product.regions(slgt())[0].area(), 25.0);
    assert!(product.errors().is_empty());
}

#[test]
fn open_polyline_encloses_its_right_side() {
    let product = parse_product("SLGT   30009500 45009500");
    let regions = product.regions(slgt());
    assert_eq!(regions.len(), 1);
    assert!(regions[0].contains_point(&Point::new(-90.0, 40.0)));
    assert!(!regions[0].contains_point(&Point::new(-100.0, 40.0)));
}

fn assert_band(product: &Product) {
    let level = RiskLevel::probability(0.05).unwrap();
    let regions = product.regions(level);
    assert_eq!(regions.len(), 1);
    assert!((regions[0].area() - 75.0).abs() < 1e-9);
    let (lo, hi) = regions[0].bounding_box().unwrap();
    assert!((lo.x + 95.0).abs() < 1e-9 && (hi.x + 90.0).abs() < 1e-9);
    assert!((lo.y - 30.0).abs() < 1e-9 && (hi.y - 45.0).abs() < 1e-9);
    assert!(product.errors().is_empty());
}

#[test]
fn two_open_polylines_make_a_band() {
    // North along 95W encloses everything east of it, and south along 90W
    // everything west of it. Only the strip between them is meant.
    let product = Product::parse(
        "hail",
        "0.05   30009500 45009500 99999999 45009000 30009000",
        &outline(),
        &ParseConfig::default(),
    );
    assert_band(&product);
}

#[test]
fn band_from_separate_contours() {
    let product = Product::parse(
        "hail",
        "0.05   30009500 45009500\n0.05   45009000 30009000",
        &outline(),
        &ParseConfig::default(),
    );
    assert_band(&product);
}

#[test]
fn sentinel_splits_polylines() {
    let contours = contour::extract(
        "SLGT 12345678 99990000 23456789",
        ProductKind::Categorical,
        &HashMap::new(),
    );
    assert_eq!(contours.levels.len(), 1);
    let (level, coords) = &contours.levels[0];
    assert_eq!(*level, slgt());
    let lines = split_polylines(coords);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], vec![Coordinate { lat: 12.34, lon: -56.78 }]);
    assert_eq!(lines[1][0].encode(), "23456789");
}

#[test]
fn full_bulletin() {
    let outlook = Outlook::parse(BULLETIN, outline()).unwrap();
    assert_eq!(
        outlook.issued(),
        Utc.with_ymd_and_hms(2016, 4, 16, 12, 59, 0).unwrap()
    );
    assert_eq!(
        outlook.valid(),
        Utc.with_ymd_and_hms(2016, 4, 16, 13, 0, 0).unwrap()
            ..Utc.with_ymd_and_hms(2016, 4, 17, 12, 0, 0).unwrap()
    );
    let names: Vec<_> = outlook.products().map(Product::name).collect();
    assert_eq!(names, ["categorical", "tornado"]);

    let cat = outlook.product("Categorical").unwrap();
    let summary: Vec<_> = cat
        .risk_levels()
        .map(|l| format!("{l} {:.1}", cat.regions(l)[0].area()))
        .collect();
    insta::assert_snapshot!(summary.join(", "), @"TSTM 150.0, SLGT 25.0");

    // The tornado product's TSTM contour is really the 45% contour.
    let tor = outlook.product("TORNADO").unwrap();
    let levels: Vec<_> = tor.risk_levels().map(|l| l.to_string()).collect();
    assert_eq!(levels, ["0.02", "0.45"]);
    assert!(tor.errors().is_empty());
    assert!(outlook.product("hail").is_none());
}

#[test]
fn missing_file() {
    assert_matches!(
        Outlook::read("/no/such/day1otlk.txt", outline()),
        Err(Error::NotFound { .. })
    );
}

#[test]
fn malformed_bulletins() {
    let unterminated = BULLETIN.replacen("&&", "", 1).replace("&&", "");
    assert_matches!(
        Outlook::parse(&unterminated, outline()),
        Err(Error::MalformedBulletin(_))
    );
    let headless = BULLETIN.replace("0759 AM CDT SAT APR 16 2016", "");
    assert_matches!(
        Outlook::parse(&headless, outline()),
        Err(Error::MalformedBulletin(_))
    );
    // No products at all is fine.
    let outlook = Outlook::parse("0759 AM CDT SAT APR 16 2016\nVALID 161300Z - 171200Z", outline())
        .unwrap();
    assert_eq!(outlook.products().count(), 0);
}

#[derive(Clone, Copy, Debug)]
struct Rect {
    lon: f64,
    lat: f64,
    w: f64,
    h: f64,
}

// Half-degree offsets keep the edges off the outline's edges.
fn rect() -> impl Strategy<Value = Rect> {
    (-112i32..-82, 26i32..48, 1i32..12, 1i32..10).prop_map(|(lon, lat, w, h)| Rect {
        lon: lon as f64 + 0.5,
        lat: lat as f64 + 0.5,
        w: w as f64,
        h: h as f64,
    })
}

/// A clockwise closed polyline around the rectangle.
fn polyline(r: Rect) -> Vec<Coordinate> {
    let c = |lat, lon| Coordinate { lat, lon };
    vec![
        c(r.lat, r.lon),
        c(r.lat + r.h, r.lon),
        c(r.lat + r.h, r.lon + r.w),
        c(r.lat, r.lon + r.w),
        c(r.lat, r.lon),
    ]
}

fn candidates(rects: &[Rect], outline: &Outline) -> Vec<Candidate> {
    rects
        .iter()
        .filter_map(|r| construct(&polyline(*r), outline, &ConstructionConfig::default()).ok())
        .flatten()
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn resolved_regions_are_disjoint(rects in prop::collection::vec(rect(), 1..5)) {
        let outline = outline();
        let config = ResolveConfig::default();
        let polys = resolve(candidates(&rects, &outline), &config).unwrap();
        for (i, a) in polys.iter().enumerate() {
            for b in &polys[(i + 1)..] {
                let overlap = Region::from(a.clone()).intersection(&Region::from(b.clone())).unwrap();
                prop_assert!(overlap.area() <= config.overlap_tolerance);
            }
        }

        // Resolving again changes nothing.
        let again: Vec<_> = polys
            .iter()
            .map(|p| Candidate { tag: p.exterior.points().to_vec(), polygon: p.clone() })
            .collect();
        prop_assert_eq!(resolve(again, &config).unwrap(), polys);
    }

    #[test]
    fn regions_stay_in_the_outline(r in rect()) {
        let outline = outline();
        for c in candidates(&[r], &outline) {
            prop_assert!(c.polygon.area() <= outline.polygon().area());
            for p in c.polygon.rings().flat_map(|ring| ring.points()) {
                prop_assert!(outline.contains(p) || outline.polygon().boundary_distance(p) < 1e-9);
            }
        }
    }
}

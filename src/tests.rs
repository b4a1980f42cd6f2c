//!
//!  End-to-end tests
//!
//! Literal scenarios plus the universal properties every accepted
//! input must satisfy: round-tripping, idempotent canonicalization,
//! strict/lenient monotonicity, bracket/paren equivalence and keyword
//! case-insensitivity.
//!
use crate::{from_wkt, ErrorCode, Parser, WktObject, WktOptions};

pub(crate) fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) mod fixtures {
    pub const LENGTH_UNIT: &str = r#"LENGTHUNIT["metre",1]"#;

    pub const WGS84: &str = concat!(
        r#"GEODCRS["WGS 84",DATUM["World Geodetic System 1984","#,
        r#"ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],"#,
        r#"CS[ellipsoidal,2],AXIS["latitude (lat)",north,ORDER[1]],"#,
        r#"AXIS["longitude (lon)",east,ORDER[2]],"#,
        r#"ANGLEUNIT["degree",0.0174532925199433],"#,
        r#"SCOPE["Horizontal component of 3D system."],"#,
        r#"AREA["World."],BBOX[-90,-180,90,180],ID["EPSG","4326"]]"#,
    );

    pub const UTM31: &str = concat!(
        r#"PROJCRS["WGS 84 / UTM zone 31N","#,
        r#"BASEGEODCRS["WGS 84",DATUM["World Geodetic System 1984","#,
        r#"ELLIPSOID["WGS 84",6378137,298.257223563]]],"#,
        r#"CONVERSION["UTM zone 31N",METHOD["Transverse Mercator",ID["EPSG","9807"]],"#,
        r#"PARAMETER["Latitude of natural origin",0],"#,
        r#"PARAMETER["Longitude of natural origin",3],"#,
        r#"PARAMETER["Scale factor at natural origin",0.9996],"#,
        r#"PARAMETER["False easting",500000],PARAMETER["False northing",0]],"#,
        r#"CS[Cartesian,2],AXIS["(E)",east,ORDER[1]],AXIS["(N)",north,ORDER[2]],"#,
        r#"LENGTHUNIT["metre",1],ID["EPSG","32631"]]"#,
    );

    pub const NEWLYN: &str = concat!(
        r#"VERTCRS["Newlyn",VDATUM["Ordnance Datum Newlyn","#,
        r#"ANCHOR["mean sea level 1915-1921"]],CS[vertical,1],"#,
        r#"AXIS["gravity-related height (H)",up],LENGTHUNIT["metre",1],"#,
        r#"ID["EPSG","5701"]]"#,
    );

    pub const GPS_TIME: &str = concat!(
        r#"TIMECRS["GPS time",TDATUM["Time origin","#,
        r#"TIMEORIGIN["1980-01-01T00:00:00.0Z"]],CS[temporal,1],"#,
        r#"AXIS["time (T)",future],TIMEUNIT["day",86400]]"#,
    );

    pub const PRESSURE: &str = concat!(
        r#"PARAMETRICCRS["WMO standard atmosphere layer 0","#,
        r#"PDATUM["Mean Sea Level",ANCHOR["1013.25 hPa at 15C"]],"#,
        r#"CS[parametric,1],AXIS["pressure (hPa)",up],"#,
        r#"PARAMETRICUNIT["HectoPascal",100]]"#,
    );

    pub const ASTRA: &str = concat!(
        r#"ENGCRS["Astra Minas Grid",EDATUM["Astra Minas"],CS[Cartesian,2],"#,
        r#"AXIS["northing (X)",north,ORDER[1]],AXIS["westing (Y)",west,ORDER[2]],"#,
        r#"LENGTHUNIT["metre",1],ID["EPSG","5800"]]"#,
    );

    pub const SITE: &str = concat!(
        r#"IMAGECRS["A construction site CRS","#,
        r#"IDATUM["A first parameter",corner],CS[Cartesian,2],"#,
        r#"AXIS["site east",southWest,ORDER[1]],AXIS["site north",southEast,ORDER[2]],"#,
        r#"LENGTHUNIT["metre",1]]"#,
    );

    pub const COMPOUND: &str = concat!(
        r#"COMPOUNDCRS["NAD83 + NAVD88","#,
        r#"GEODCRS["NAD83",DATUM["North American Datum 1983","#,
        r#"ELLIPSOID["GRS 1980",6378137,298.257222101]],CS[ellipsoidal,2],"#,
        r#"AXIS["latitude",north],AXIS["longitude",east],"#,
        r#"ANGLEUNIT["degree",0.0174532925199433]],"#,
        r#"VERTCRS["NAVD88",VDATUM["North American Vertical Datum 1988"],"#,
        r#"CS[vertical,1],AXIS["gravity-related height (H)",up],"#,
        r#"LENGTHUNIT["metre",1]]]"#,
    );

    pub const DERIVED_VERT: &str = concat!(
        r#"VERTCRS["EGM2008 geoid height","#,
        r#"BASEVERTCRS["EGM2008 geoid",VDATUM["EGM2008 geoid"]],"#,
        r#"DERIVINGCONVERSION["vertical offset",METHOD["Vertical Offset"],"#,
        r#"PARAMETER["Vertical Offset",0.015],"#,
        r#"PARAMETERFILE["Geoid model","EGM08.gtx"]],"#,
        r#"CS[vertical,1],AXIS["gravity-related height (H)",up],"#,
        r#"LENGTHUNIT["metre",1]]"#,
    );

    // A classic WKT1 PROJCS as emitted by most legacy tooling
    pub const NAD83_WKT1: &str = concat!(
        r#"PROJCS["NAD83 / Massachusetts Mainland",GEOGCS["NAD83","#,
        r#"DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101,"#,
        r#"AUTHORITY["EPSG","7019"]],AUTHORITY["EPSG","6269"]],PRIMEM["Greenwich",0,"#,
        r#"AUTHORITY["EPSG","8901"]],UNIT["degree",0.01745329251994328,"#,
        r#"AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4269"]],UNIT["metre",1,"#,
        r#"AUTHORITY["EPSG","9001"]],PROJECTION["Lambert_Conformal_Conic_2SP"],"#,
        r#"PARAMETER["standard_parallel_1",42.68333333333333],"#,
        r#"PARAMETER["standard_parallel_2",41.71666666666667],"#,
        r#"PARAMETER["latitude_of_origin", -41],PARAMETER["central_meridian",-71.5],"#,
        r#"PARAMETER["false_easting",200000],PARAMETER["false_northing",750000],"#,
        r#"AUTHORITY["EPSG","26986"],AXIS["X",EAST],AXIS["Y",NORTH]]"#,
    );

    pub const ALL: &[&str] = &[
        LENGTH_UNIT,
        WGS84,
        UTM31,
        NEWLYN,
        GPS_TIME,
        PRESSURE,
        ASTRA,
        SITE,
        COMPOUND,
        DERIVED_VERT,
        NAD83_WKT1,
    ];
}

// Apply `f` to every character outside quoted regions.
fn map_outside_quotes(s: &str, f: impl Fn(char) -> char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_quotes = false;
    for c in s.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            out.push(c);
        } else if in_quotes {
            out.push(c);
        } else {
            out.push(f(c));
        }
    }
    out
}

// ------------------------------------------------------------------
// literal scenarios
// ------------------------------------------------------------------

#[test]
fn minimal_length_unit() {
    setup();
    let obj = from_wkt(r#"LENGTHUNIT["metre",1.0]"#).unwrap();
    let canonical = obj.to_wkt(WktOptions::new()).unwrap();
    assert_eq!(canonical, r#"LENGTHUNIT["metre",1]"#);
    assert!(from_wkt(&canonical).unwrap().compute_eq(&obj));
}

#[test]
fn wkt1_spheroid_alias() {
    let obj = from_wkt(r#"SPHEROID["WGS 84",6378137,298.257223563]"#).unwrap();
    assert_eq!(
        obj.to_wkt(WktOptions::new()).unwrap(),
        r#"ELLIPSOID["WGS 84",6378137,298.257223563]"#
    );
    assert_eq!(
        obj.to_wkt(WktOptions::new().old_syntax()).unwrap(),
        r#"SPHEROID["WGS 84",6378137,298.257223563]"#
    );
}

#[test]
fn identifier_old_vs_new() {
    let obj = from_wkt(r#"ID["EPSG",4326]"#).unwrap();
    assert_eq!(
        obj.to_wkt(WktOptions::new()).unwrap(),
        r#"ID["EPSG","4326"]"#
    );
    assert_eq!(
        obj.to_wkt(WktOptions::new().old_syntax()).unwrap(),
        r#"AUTHORITY["EPSG",4326]"#
    );
}

#[test]
fn escaped_quote_in_text() {
    let obj = from_wkt(r#"CITATION["say ""hi"" loud"]"#).unwrap();
    match &obj {
        WktObject::Citation(c) => assert_eq!(c.text(), r#"say "hi" loud"#),
        other => panic!("unexpected kind {:?}", other.kind()),
    }
    assert_eq!(
        obj.to_wkt(WktOptions::new()).unwrap(),
        r#"CITATION["say ""hi"" loud"]"#
    );
}

#[test]
fn axis_placement_by_order() {
    let wkt = concat!(
        r#"GEODCRS["X",DATUM["D",ELLIPSOID["E",6378137,298.257223563]],"#,
        r#"CS[ellipsoidal,2],AXIS["(lon)",east,ORDER[2]],AXIS["(lat)",north,ORDER[1]],"#,
        r#"ANGLEUNIT["degree",0.0174532925199433]]"#,
    );
    let obj = from_wkt(wkt).unwrap();
    let crs = match &obj {
        WktObject::Crs(c) => c,
        other => panic!("unexpected kind {:?}", other.kind()),
    };
    assert_eq!(crs.axis(0).unwrap().abbr(), "lat");
    assert_eq!(crs.axis(1).unwrap().abbr(), "lon");
    let out = obj.to_wkt(WktOptions::new()).unwrap();
    assert!(out.find("(lat)").unwrap() < out.find("(lon)").unwrap());
}

#[test]
fn lenient_trailing_garbage() {
    let wkt = r#"LENGTHUNIT["metre",1.0]] extra rubbish"#;

    let err = Parser::new().parse(wkt).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TooManyCloseTokens);

    let obj = Parser::new().strict(false).parse(wkt).unwrap();
    assert!(obj.compute_eq(&from_wkt(r#"LENGTHUNIT["metre",1]"#).unwrap()));
}

// ------------------------------------------------------------------
// universal properties over the fixture corpus
// ------------------------------------------------------------------

#[test]
fn roundtrip_parse_emit_parse() {
    setup();
    for wkt in fixtures::ALL {
        let obj = from_wkt(wkt).unwrap();
        let emitted = obj.to_wkt(WktOptions::new()).unwrap();
        let again = from_wkt(&emitted).unwrap();
        assert!(again.compute_eq(&obj), "roundtrip failed for {wkt}");
    }
}

#[test]
fn idempotent_canonicalization() {
    for wkt in fixtures::ALL {
        let first = from_wkt(wkt).unwrap().to_wkt(WktOptions::new()).unwrap();
        let second = from_wkt(&first).unwrap().to_wkt(WktOptions::new()).unwrap();
        assert_eq!(first, second, "canonicalization unstable for {wkt}");
    }
}

#[test]
fn strict_monotonicity() {
    for wkt in fixtures::ALL {
        let strict = from_wkt(wkt).unwrap();
        let lenient = Parser::new().strict(false).parse(wkt).unwrap();
        assert!(strict.compute_eq(&lenient), "trees differ for {wkt}");
    }
}

#[test]
fn bracket_paren_equivalence() {
    for wkt in fixtures::ALL {
        let parens = map_outside_quotes(wkt, |c| match c {
            '[' => '(',
            ']' => ')',
            other => other,
        });
        let a = from_wkt(wkt).unwrap();
        let b = from_wkt(&parens).unwrap();
        assert!(a.compute_eq(&b), "paren form differs for {wkt}");
    }
}

#[test]
fn keyword_case_insensitivity() {
    for wkt in fixtures::ALL {
        let lower = map_outside_quotes(wkt, |c| c.to_ascii_lowercase());
        let a = from_wkt(wkt).unwrap();
        let b = from_wkt(&lower).unwrap();
        assert!(a.compute_eq(&b), "lower-cased form differs for {wkt}");
    }
}

#[test]
fn expanded_output_reparses() {
    for wkt in fixtures::ALL {
        let obj = from_wkt(wkt).unwrap();
        let expanded = obj.to_wkt(WktOptions::new().expand_sp()).unwrap();
        let again = from_wkt(&expanded).unwrap();
        assert!(again.compute_eq(&obj), "expanded form differs for {wkt}");
    }
    // nested objects land on indented lines
    let expanded = from_wkt(fixtures::UTM31)
        .unwrap()
        .to_wkt(WktOptions::new().expand_sp())
        .unwrap();
    assert!(expanded.contains("\n BASEGEODCRS["));
}

#[test]
fn parens_output_reparses() {
    let obj = from_wkt(fixtures::UTM31).unwrap();
    let parens = obj.to_wkt(WktOptions::new().parens()).unwrap();
    assert!(parens.contains('(') && !parens.contains('['));
    let again = from_wkt(&parens).unwrap();
    assert!(again.compute_eq(&obj));
}

#[test]
fn clone_independence() {
    for wkt in fixtures::ALL {
        let a = from_wkt(wkt).unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        let emitted = b.to_wkt(WktOptions::new()).unwrap();
        drop(a);
        assert_eq!(b.to_wkt(WktOptions::new()).unwrap(), emitted);
    }
}

#[test]
fn validation_coverage_vertical() {
    // every (CS kind, dimension) combination outside the table is
    // rejected for a vertical CRS
    let kinds = [
        "affine",
        "Cartesian",
        "cylindrical",
        "ellipsoidal",
        "linear",
        "parametric",
        "polar",
        "spherical",
        "temporal",
        "vertical",
    ];
    for cs in kinds {
        for dim in 1..=3 {
            let wkt = format!(r#"VERTCRS["x",VDATUM["d"],CS[{cs},{dim}],AXIS["h",up]]"#);
            let accepted = from_wkt(&wkt).is_ok();
            assert_eq!(accepted, cs == "vertical" && dim == 1, "{wkt}");
        }
    }
}

#[test]
fn validation_coverage_projected() {
    let base = concat!(
        r#"BASEGEODCRS["b",DATUM["d",ELLIPSOID["e",6378137,298.3]]],"#,
        r#"CONVERSION["c",METHOD["m"]]"#,
    );
    for (cs, dim, want) in [
        ("Cartesian", 2, true),
        ("Cartesian", 3, false),
        ("ellipsoidal", 2, false),
        ("vertical", 1, false),
    ] {
        let wkt = format!(r#"PROJCRS["x",{base},CS[{cs},{dim}]]"#);
        assert_eq!(from_wkt(&wkt).is_ok(), want, "{wkt}");
    }
}

// ------------------------------------------------------------------
// options and error channel
// ------------------------------------------------------------------

#[test]
fn id_suppression_options() {
    let obj = from_wkt(fixtures::UTM31).unwrap();

    let none = obj.to_wkt(WktOptions::new().no_ids()).unwrap();
    assert!(!none.contains("ID["));

    let top = obj.to_wkt(WktOptions::new().top_id_only()).unwrap();
    assert!(top.contains(r#"ID["EPSG","32631"]"#));
    assert!(!top.contains(r#"ID["EPSG","9807"]"#));
}

#[test]
fn duplicate_identifiers_rejected() {
    let err = from_wkt(r#"LENGTHUNIT["metre",1,ID["EPSG",9001],ID["epsg",9002]]"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateId);
}

#[test]
fn sink_receives_every_error() {
    let mut codes: Vec<ErrorCode> = Vec::new();
    {
        let mut parser = Parser::new().on_error(|e| codes.push(e.code()));
        let _ = parser.parse(r#"LENGTHUNIT["metre",0]"#);
    }
    assert_eq!(codes, vec![ErrorCode::InvalidUnitFactor]);
}

#[test]
fn wkt1_roundtrip_through_model() {
    setup();
    // WKT1 in, modern out, WKT1 back out again
    let obj = from_wkt(fixtures::NAD83_WKT1).unwrap();
    let modern = obj.to_wkt(WktOptions::new()).unwrap();
    assert!(modern.starts_with("PROJCRS["));
    assert!(modern.contains("BASEGEODCRS["));

    let old = obj.to_wkt(WktOptions::new().old_syntax()).unwrap();
    assert!(old.starts_with("PROJCS["));
    assert!(old.contains(r#"PROJECTION["Lambert_Conformal_Conic_2SP"]"#));
    assert!(old.contains(r#"AUTHORITY["EPSG",26986]"#));

    // the legacy emission parses back to an equivalent tree
    let again = from_wkt(&old).unwrap();
    assert!(again.compute_eq(&obj));
}

#[test]
fn visibility_suppresses_output() {
    let mut obj = from_wkt(fixtures::NEWLYN).unwrap();
    if let WktObject::Crs(crs) = &mut obj {
        // structural comparison still sees the hidden flag
        assert!(crs.is_visible());
    }
    obj.set_visible(false);
    assert_eq!(obj.to_wkt(WktOptions::new()).unwrap(), "");
}

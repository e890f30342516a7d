//! Legacy header round trips: words <-> legacy struct <-> modern model.

use gridinfo::legacy::{pack_str, unpack_str, LegacyExt, RANGE_SLOTS, TEXT_WORDS};
use gridinfo::{
    decode, encode, to_legacy, to_modern, ConsistencyWarning, GridFamily, GridInfo, GridType,
    LegacyGridInfo,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_utils::{
    assert_approx_eq, fields, pathnames, random_f32, random_range_table, random_text,
};

fn text_slot(text: &str) -> [i32; TEXT_WORDS] {
    let mut out = [0; TEXT_WORDS];
    for (slot, word) in out.iter_mut().zip(pack_str(text)) {
        *slot = word;
    }
    out
}

/// Header for `family` with every field set from `rng`.
fn random_legacy(family: GridFamily, rng: &mut StdRng) -> LegacyGridInfo {
    let mut info = LegacyGridInfo::new(family);
    info.grid_type = family.legacy_code() + rng.gen_range(0..2);
    info.stime = rng.gen_range(0..60_000_000);
    info.etime = info.stime + rng.gen_range(0..10_000);
    info.data_units = text_slot(&random_text(rng, TEXT_WORDS * 4));
    info.data_type = rng.gen_range(0..6);
    info.lower_left_x = rng.gen_range(-5000..5000);
    info.lower_left_y = rng.gen_range(-5000..5000);
    info.cols = rng.gen_range(1..2000);
    info.rows = rng.gen_range(1..2000);
    info.cell_size = random_f32(rng, 1.0e5);
    info.compression_method = [0, 1, 26, 101001][rng.gen_range(0..4usize)];
    info.compression_size = rng.gen_range(0..1_000_000);
    info.compression_factor = random_f32(rng, 1.0e3);
    info.compression_base = random_f32(rng, 1.0e3);
    info.max_val = random_f32(rng, 1.0e6);
    info.min_val = random_f32(rng, 1.0e6);
    info.mean_val = random_f32(rng, 1.0e6);
    info.range_length = rng.gen_range(0..=RANGE_SLOTS as i32);
    let floor = random_f32(rng, 1.0e3);
    let (vals, counts) = random_range_table(rng, RANGE_SLOTS, floor, info.rows * info.cols);
    info.range_vals.copy_from_slice(&vals);
    info.range_counts.copy_from_slice(&counts);

    match &mut info.ext {
        LegacyExt::Undefined => {}
        LegacyExt::Hrap(h) => h.data_source = text_slot(&random_text(rng, TEXT_WORDS * 4)),
        LegacyExt::Albers(a) => {
            a.proj_datum = rng.gen_range(0..3);
            a.proj_units = text_slot(&random_text(rng, TEXT_WORDS * 4));
            a.first_parallel = random_f32(rng, 90.0);
            a.sec_parallel = random_f32(rng, 90.0);
            a.central_meridian = random_f32(rng, 180.0);
            a.lat_origin = random_f32(rng, 90.0);
            a.false_easting = random_f32(rng, 1.0e6);
            a.false_northing = random_f32(rng, 1.0e6);
            a.xcoord_cell0 = random_f32(rng, 1.0e6);
            a.ycoord_cell0 = random_f32(rng, 1.0e6);
        }
        LegacyExt::Specified(s) => {
            s.crs_name = pack_str(&random_text(rng, 40));
            s.crs_type = rng.gen_range(0..3);
            s.crs_def = pack_str(&random_text(rng, 400));
            s.xcoord_cell0 = random_f32(rng, 1.0e7);
            s.ycoord_cell0 = random_f32(rng, 1.0e7);
            s.nodata = random_f32(rng, 1.0e4);
            s.tzid = pack_str(&random_text(rng, 32));
            s.tzoffset = rng.gen_range(-12..=12);
            s.is_interval = rng.gen_range(0..2);
            s.time_stamped = rng.gen_range(0..2);
        }
    }
    info.refresh_sizes();
    info
}

fn float_bits(info: &LegacyGridInfo) -> Vec<u32> {
    let mut bits: Vec<u32> = [
        info.cell_size,
        info.compression_factor,
        info.compression_base,
        info.max_val,
        info.min_val,
        info.mean_val,
    ]
    .iter()
    .chain(info.range_vals.iter())
    .map(|v| v.to_bits())
    .collect();
    match &info.ext {
        LegacyExt::Albers(a) => bits.extend(
            [
                a.first_parallel,
                a.sec_parallel,
                a.central_meridian,
                a.lat_origin,
                a.false_easting,
                a.false_northing,
                a.xcoord_cell0,
                a.ycoord_cell0,
            ]
            .iter()
            .map(|v| v.to_bits()),
        ),
        LegacyExt::Specified(s) => {
            bits.extend([s.xcoord_cell0, s.ycoord_cell0, s.nodata].iter().map(|v| v.to_bits()))
        }
        _ => {}
    }
    bits
}

fn specified_legacy(crs_name: &str, crs: &str, tzid: &str) -> LegacyGridInfo {
    let mut info = LegacyGridInfo::new(GridFamily::Specified);
    info.rows = 4;
    info.cols = 5;
    info.cell_size = 100.0;
    info.data_type = 3;
    if let LegacyExt::Specified(s) = &mut info.ext {
        s.crs_name = pack_str(crs_name);
        s.crs_def = pack_str(crs);
        s.tzid = pack_str(tzid);
        s.nodata = -9999.0;
        s.xcoord_cell0 = 1000.0;
        s.ycoord_cell0 = 4000.0;
    }
    info.refresh_sizes();
    info
}

#[test]
fn test_specified_words_roundtrip_across_text_lengths() {
    // empty, exactly one word, and several words
    for (name, crs, tzid) in [
        ("", "", ""),
        ("UTM", "EPSG", "UTC"),
        ("UTM15N", "PROJCS[\"NAD_1983_UTM_Zone_15N\"]", "America/Chicago"),
    ] {
        let legacy = specified_legacy(name, crs, tzid);
        let words = encode(&legacy).unwrap();
        assert_eq!(words[0] as usize, words.len() * 4);

        let decoded = decode(&words, legacy.grid_type).unwrap();
        assert_eq!(decoded, legacy);
        let s = decoded.specified().unwrap();
        assert_eq!(unpack_str(&s.crs_name), name);
        assert_eq!(unpack_str(&s.crs_def), crs);
        assert_eq!(unpack_str(&s.tzid), tzid);
    }
}

#[test]
fn test_every_family_decodes_its_own_words() {
    let mut rng = StdRng::seed_from_u64(0xd55);
    for family in [
        GridFamily::Undefined,
        GridFamily::Hrap,
        GridFamily::Albers,
        GridFamily::Specified,
    ] {
        for _ in 0..25 {
            let legacy = random_legacy(family, &mut rng);
            let words = encode(&legacy).unwrap();
            assert_eq!(words.len(), legacy.word_count());
            assert_eq!(words[0] as usize, words.len() * 4);

            let decoded = decode(&words, legacy.grid_type).unwrap();
            assert_eq!(decoded, legacy);
            assert_eq!(float_bits(&decoded), float_bits(&legacy));
            assert_eq!(encode(&decoded).unwrap(), words);
        }
    }
}

#[test]
fn test_header_text_survives_the_codec() {
    let mut rng = StdRng::seed_from_u64(0x7e47);
    for _ in 0..25 {
        let units = random_text(&mut rng, TEXT_WORDS * 4);
        let source = random_text(&mut rng, TEXT_WORDS * 4);
        let mut legacy = LegacyGridInfo::new(GridFamily::Hrap);
        legacy.data_units = text_slot(&units);
        if let LegacyExt::Hrap(h) = &mut legacy.ext {
            h.data_source = text_slot(&source);
        }
        let decoded = decode(&encode(&legacy).unwrap(), 410).unwrap();
        // trailing spaces are kept, only NUL padding is dropped
        assert_eq!(unpack_str(&decoded.data_units), units);
        assert_eq!(unpack_str(&decoded.hrap().unwrap().data_source), source);
    }
}

#[test]
fn test_modern_to_legacy_and_back_keeps_specified_fields() {
    let info = GridInfo::build(GridType::SpecifiedTime, &fields::specified_basic(3, 4, -9999.0)).unwrap();
    let conversion = to_legacy(&info, pathnames::ONE_HOUR).unwrap();
    assert!(conversion.warnings.is_empty());
    assert!(conversion.legacy.stime > 0);
    assert_eq!(conversion.legacy.etime - conversion.legacy.stime, 60);

    let words = encode(&conversion.legacy).unwrap();
    let back = to_modern(&decode(&words, conversion.legacy.grid_type).unwrap()).unwrap();
    let s = back.as_specified().unwrap();
    assert_eq!(s.crs_name, "UTM15N");
    assert_eq!(s.crs, "PROJCS[\"NAD_1983_UTM_Zone_15N\"]");
    assert_eq!(s.nodata, -9999.0);
    assert_eq!(s.coords_cell0, Some((500000.0, 3000000.0)));
    assert_eq!(back.base().lower_left_cell, (0, 0));
    assert_eq!(back.extra()["stime"], conversion.legacy.stime);
}

#[test]
fn test_long_units_are_truncated_with_warning() {
    let mut input = fields::albers_precip(2, 2);
    input.insert("data_units".into(), "MILLIMETERS PER HOUR".into());
    let info = GridInfo::build(GridType::AlbersTime, &input).unwrap();

    let conversion = to_legacy(&info, pathnames::ONE_HOUR).unwrap();
    assert_eq!(unpack_str(&conversion.legacy.data_units), "MILLIMETERS ");
    assert!(conversion.warnings.iter().any(|w| matches!(
        w,
        ConsistencyWarning::Truncated { field, kept, .. } if field == "data_units" && kept.len() == 12
    )));
}

#[test]
fn test_unparseable_pathname_times_are_flagged() {
    let info = GridInfo::build(GridType::Albers, &fields::albers_precip(2, 2)).unwrap();
    let conversion = to_legacy(&info, pathnames::UNDATED).unwrap();
    assert!(conversion.has_time_issue());
    assert_eq!(conversion.legacy.stime, 0);
    assert_eq!(conversion.legacy.etime, 0);

    let instant = to_legacy(&info, pathnames::INSTANT).unwrap();
    assert!(instant.legacy.stime > 0);
    assert!(instant.has_time_issue());
}

#[test]
fn test_random_albers_survives_demotion_and_promotion() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let rows: usize = rng.gen_range(1..200);
        let cols: usize = rng.gen_range(1..200);
        let (llx, lly) = (rng.gen_range(-500i32..500), rng.gen_range(-500i32..500));
        let mut input = fields::albers_precip(rows, cols);
        input.insert("min_xy".into(), serde_json::json!([llx as f64 * 2000.0, lly as f64 * 2000.0]));
        input.insert("max_val".into(), rng.gen_range(0.0..100.0f32).into());
        input.insert("min_val".into(), 0.0f64.into());
        input.insert("mean_val".into(), 0.5f64.into());
        let info = GridInfo::build(GridType::AlbersTime, &input).unwrap();

        let conversion = to_legacy(&info, pathnames::ONE_HOUR).unwrap();
        let words = encode(&conversion.legacy).unwrap();
        assert_eq!(words.len(), 75);
        let back = to_modern(&decode(&words, 420).unwrap()).unwrap();

        assert_eq!(back.grid_type(), GridType::AlbersTime);
        assert_eq!(back.base().shape, (rows, cols));
        assert_eq!(info.base().lower_left_cell, (llx, lly));
        assert_eq!(back.base().lower_left_cell, (llx, lly));
        assert_approx_eq!(back.base().max_val, info.base().max_val, 1e-4);
        assert_approx_eq!(back.base().mean_val, 0.5, 1e-6);
        let a = back.as_albers().unwrap();
        assert_eq!(a.proj_units, "meter");
        assert_approx_eq!(a.lat_1, 29.5, 1e-6);
        assert_approx_eq!(a.lon_0, -96.0, 1e-6);
    }
}

#[test]
fn test_untimed_grid_types_promote_from_time_codes() {
    let info = GridInfo::build(GridType::Hrap, &fields::hrap_basic(3, 3)).unwrap();
    let conversion = to_legacy(&info, pathnames::ONE_HOUR).unwrap();
    assert_eq!(conversion.legacy.grid_type, GridType::HrapTime.code());
    let back = to_modern(&conversion.legacy).unwrap();
    assert_eq!(back.as_hrap().unwrap().data_source, "MPE");
    assert_eq!(back.base().lower_left_cell, (367, 263));
}

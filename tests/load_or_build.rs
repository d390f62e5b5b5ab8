use arrow::array::AsArray;
use dottraffic::{load, preprocess, DatasetPaths, Error};
use flate2::{write::GzEncoder, Compression};
use std::{fs, io::Write, path::Path};
use tempfile::tempdir;

fn write_gz(path: &Path, text: &str) -> std::io::Result<()> {
    let mut enc = GzEncoder::new(fs::File::create(path)?, Compression::default());
    enc.write_all(text.as_bytes())?;
    enc.finish()?;
    Ok(())
}

fn traffic_text() -> String {
    let hours: Vec<String> = (0..24)
        .map(|h| format!("traffic_volume_counted_after_{:02}00_to_{:02}00", h, h + 1))
        .collect();
    let mut out = format!(
        "date,day_of_data,day_of_week,direction_of_travel,direction_of_travel_name,fips_state_code,functional_classification,functional_classification_name,lane_of_travel,month_of_data,record_type,restrictions,station_id,{},year_of_data\n",
        hours.join(",")
    );
    let rows = [
        ("2015-01-01", 1, "North", 4, "2U", "Urban: Principal Arterial - Other Freeways or Expressways", "000146"),
        ("2015-01-01", 5, "South", 4, "2U", "Urban: Principal Arterial - Other Freeways or Expressways", "000146"),
        ("2015-01-02", 3, "East", 48, "6R", "Rural: Minor Collector", "T0100"),
    ];
    for (date, dir, dir_name, state, class, class_name, station) in rows {
        let volumes: Vec<String> = (0..24).map(|h| (h * 3).to_string()).collect();
        out.push_str(&format!(
            "{date},1,5,{dir},{dir_name},{state},{class},{class_name},0,1,3,,{station},{},15\n",
            volumes.join(",")
        ));
    }
    out
}

fn station_text() -> String {
    [
        "fips_county_code,fips_state_code,latitude,longitude,number_of_lanes_in_direction_indicated,number_of_lanes_monitored_for_traffic_volume,record_type,station_id,station_location,year_of_data,year_station_discontinued,year_station_established",
        "13,4,33.4,-112.0,3,3,S,000146,Phoenix I-10,15,0,1995",
        "201,48,29.7,-95.3,1,1,S,T0100,\"Harris County, FM 1960\",15,0,2010",
    ]
    .join("\n")
        + "\n"
}

fn seeded(dir: &Path) -> anyhow::Result<DatasetPaths> {
    let paths = DatasetPaths::under(dir);
    write_gz(&paths.traffic_source, &traffic_text())?;
    write_gz(&paths.station_source, &station_text())?;
    Ok(paths)
}

#[test]
fn load_matches_direct_preprocess() -> anyhow::Result<()> {
    let built_dir = tempdir()?;
    let direct = preprocess(&seeded(built_dir.path())?)?;

    let load_dir = tempdir()?;
    let paths = seeded(load_dir.path())?;
    let outcome = load(&paths)?;
    assert!(outcome.was_rebuilt());
    assert_eq!(outcome.data(), &direct);

    let again = load(&paths)?;
    assert!(!again.was_rebuilt());
    assert_eq!(again.into_data(), direct);
    Ok(())
}

#[test]
fn cached_tables_carry_padded_state_and_no_labels() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let paths = seeded(dir.path())?;
    let data = load(&paths)?.into_data();

    let schema = data.traffic.schema();
    assert!(schema.index_of("direction_of_travel_name").is_err());
    assert!(schema.index_of("functional_classification_name").is_err());

    let idx = schema.index_of("fips_state_code")?;
    let states: Vec<&str> = data.traffic.column(idx).as_string::<i32>().iter().flatten().collect();
    assert_eq!(states, vec!["04", "04", "48"]);

    assert_eq!(data.mappings.label("direction_of_travel", "5"), Some("South"));
    assert_eq!(data.mappings.label("fips_state_abb", "48"), Some("TX"));
    assert_eq!(
        data.mappings.label("functional_classification", "6R"),
        Some("Rural: Minor Collector")
    );

    let mapping_json = fs::read_to_string(&paths.mapping_cache)?;
    assert!(mapping_json.contains("\"direction_of_travel\""));
    Ok(())
}

#[test]
fn missing_everything_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load(&DatasetPaths::under(dir.path())).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

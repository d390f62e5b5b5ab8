// src/schema/columns.rs

use super::types::{CategoricalPair, Column, ColumnKind::*, TableSpec};

/// Shared key between the traffic and station tables.
pub const STATE_CODE_COLUMN: &str = "fips_state_code";

/// Columns kept from `dot_traffic_2015.txt.gz`.
///
/// `record_type`, `restrictions`, `year_of_data` and `lane_of_travel` are
/// left out: the first three are constant across the whole file and the lane
/// split only restates the combined-lane totals.
pub const TRAFFIC: TableSpec = TableSpec {
    name: "traffic",
    columns: &[
        Column::new("date", Text),
        Column::new("day_of_data", Integer),
        Column::new("day_of_week", Integer),
        Column::new("direction_of_travel", Integer),
        Column::new("direction_of_travel_name", Text),
        Column::new(STATE_CODE_COLUMN, Text),
        Column::new("functional_classification", Text),
        Column::new("functional_classification_name", Text),
        Column::new("month_of_data", Integer),
        Column::new("station_id", Text),
        Column::new("traffic_volume_counted_after_0000_to_0100", Integer),
        Column::new("traffic_volume_counted_after_0100_to_0200", Integer),
        Column::new("traffic_volume_counted_after_0200_to_0300", Integer),
        Column::new("traffic_volume_counted_after_0300_to_0400", Integer),
        Column::new("traffic_volume_counted_after_0400_to_0500", Integer),
        Column::new("traffic_volume_counted_after_0500_to_0600", Integer),
        Column::new("traffic_volume_counted_after_0600_to_0700", Integer),
        Column::new("traffic_volume_counted_after_0700_to_0800", Integer),
        Column::new("traffic_volume_counted_after_0800_to_0900", Integer),
        Column::new("traffic_volume_counted_after_0900_to_1000", Integer),
        Column::new("traffic_volume_counted_after_1000_to_1100", Integer),
        Column::new("traffic_volume_counted_after_1100_to_1200", Integer),
        Column::new("traffic_volume_counted_after_1200_to_1300", Integer),
        Column::new("traffic_volume_counted_after_1300_to_1400", Integer),
        Column::new("traffic_volume_counted_after_1400_to_1500", Integer),
        Column::new("traffic_volume_counted_after_1500_to_1600", Integer),
        Column::new("traffic_volume_counted_after_1600_to_1700", Integer),
        Column::new("traffic_volume_counted_after_1700_to_1800", Integer),
        Column::new("traffic_volume_counted_after_1800_to_1900", Integer),
        Column::new("traffic_volume_counted_after_1900_to_2000", Integer),
        Column::new("traffic_volume_counted_after_2000_to_2100", Integer),
        Column::new("traffic_volume_counted_after_2100_to_2200", Integer),
        Column::new("traffic_volume_counted_after_2200_to_2300", Integer),
        Column::new("traffic_volume_counted_after_2300_to_2400", Integer),
    ],
};

/// Columns kept from `dot_traffic_stations_2015.txt.gz`.
pub const STATION: TableSpec = TableSpec {
    name: "station",
    columns: &[
        Column::new("fips_county_code", Integer),
        Column::new(STATE_CODE_COLUMN, Text),
        Column::new("latitude", Float),
        Column::new("longitude", Float),
        Column::new("number_of_lanes_in_direction_indicated", Integer),
        Column::new("number_of_lanes_monitored_for_traffic_volume", Integer),
        Column::new("station_id", Text),
        Column::new("station_location", Text),
        Column::new("year_station_discontinued", Integer),
        Column::new("year_station_established", Integer),
    ],
};

/// Code/label pairs of the traffic table turned into lookup mappings.
pub const CATEGORICAL_PAIRS: &[CategoricalPair] = &[
    CategoricalPair::new("direction_of_travel", "direction_of_travel_name"),
    CategoricalPair::new("functional_classification", "functional_classification_name"),
];

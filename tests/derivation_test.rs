use region_series::domain::model::{
    ChartKind, ChartSpec, Dimension, GroupKey, Metric, Record, RegionAverage, SeriesRequest,
};
use region_series::{derive, derive_request, group_by, ChartSession, SelectionEvent};

fn row(region: &str, category: &str, date: &str, profit: &str) -> Record {
    Record::new(region, category, date, profit, "0")
}

#[test]
fn test_furniture_profit_scenario() {
    let records = vec![
        row("TX", "Furniture", "2014-01-05", "10"),
        row("TX", "Furniture", "2014-02-05", "20"),
        row("CA", "Furniture", "2014-03-05", "5"),
    ];

    let derivation = derive(
        &records,
        Dimension::Category,
        &GroupKey::Category("Furniture".to_string()),
        Metric::Profit,
    );

    assert_eq!(
        derivation.series.points,
        vec![
            RegionAverage {
                region: "TX".to_string(),
                value: 15.0,
            },
            RegionAverage {
                region: "CA".to_string(),
                value: 5.0,
            },
        ]
    );
    assert!(derivation.issues.is_empty());
}

#[test]
fn test_year_grouping_scenario() {
    let records = vec![
        row("TX", "Furniture", "2014-01-05", "1"),
        row("CA", "Furniture", "2014-11-20", "1"),
        row("NY", "Furniture", "not-a-date", "1"),
    ];

    let (by_year, issues) = group_by(&records, Dimension::Year);
    assert_eq!(by_year.keys(), &[GroupKey::Year(2014)]);
    assert_eq!(by_year.get(&GroupKey::Year(2014)).map(|g| g.len()), Some(2));
    assert_eq!(issues.len(), 1);

    let (by_category, issues) = group_by(&records, Dimension::Category);
    assert!(issues.is_empty());
    let furniture = by_category
        .get(&GroupKey::Category("Furniture".to_string()))
        .unwrap();
    assert_eq!(furniture.len(), 3);
}

#[test]
fn test_empty_dataset_never_errors() {
    let request = SeriesRequest {
        dimension: Dimension::Year,
        selected_key: "2014".to_string(),
        metric: Metric::Profit,
    };

    let derivation = derive_request(&[], &request);
    assert!(derivation.series.available_keys.is_empty());
    assert!(derivation.series.points.is_empty());
    assert!(derivation.issues.is_empty());
}

#[test]
fn test_request_round_trips_through_json() {
    let request = SeriesRequest {
        dimension: Dimension::Category,
        selected_key: "Technology".to_string(),
        metric: Metric::Sales,
    };

    let json = serde_json::to_string(&request).unwrap();
    assert_eq!(
        json,
        r#"{"dimension":"category","selectedKey":"Technology","metric":"sales"}"#
    );
}

#[test]
fn test_session_replays_selection_events() {
    let records = vec![
        row("TX", "Furniture", "2014-01-05", "10"),
        row("CA", "Technology", "2015-01-05", "40"),
        row("CA", "Technology", "2015-02-05", "oops"),
    ];
    let spec = ChartSpec::new("profit", ChartKind::Bar, Dimension::Category, Metric::Profit);
    let mut session = ChartSession::new(spec, &records);

    let events: Vec<SelectionEvent> =
        serde_json::from_str(r#"[{"key":"Technology"},{"key":"Furniture"}]"#).unwrap();

    let technology = session.select(events[0].clone());
    assert_eq!(technology.series.points[0].value, 20.0);
    assert_eq!(technology.issues.len(), 1);

    let furniture = session.select(events[1].clone());
    assert_eq!(furniture.series.points[0].region, "TX");
    assert_eq!(furniture, session.current());
}

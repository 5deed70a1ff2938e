use chrono::{TimeZone, Utc};

use crate::entities::{Persistence, Place, PlaceType};

fn demo_place(
    id: &str,
    name: &str,
    place_type: PlaceType,
    address: &str,
    notes: &str,
    features: &[&str],
    confirmations: u64,
    (year, month, day): (i32, u32, u32),
) -> Place {
    Place {
        id: id.into(),
        name: name.into(),
        place_type,
        address: address.into(),
        notes: notes.into(),
        features: features.iter().map(|f| f.to_string()).collect(),
        confirmations,
        reports: 0,
        created_at: Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single(),
        persistence: Persistence::Local,
    }
}

/// Fallback places shown when the store is empty or unreachable.
pub fn places() -> Vec<Place> {
    vec![
        demo_place(
            "demo-1",
            "Green Leaf Cafeteria",
            PlaceType::PublicArea,
            "Building A, Campus Lane",
            "Wide doorway, ramp at main entrance. Staff friendly and helpful.",
            &["wheelchair", "restroom", "step_free"],
            4,
            (2025, 9, 10),
        ),
        demo_place(
            "demo-2",
            "Main Library \u{2014} North Wing",
            PlaceType::Office,
            "Library Road, North Wing",
            "Elevator available to all floors. Some narrow aisles near periodicals.",
            &["lift", "wheelchair", "parking"],
            6,
            (2025, 8, 21),
        ),
        demo_place(
            "demo-3",
            "Chemistry Building \u{2014} Restroom",
            PlaceType::Washroom,
            "Science Block, 1st Floor",
            "Accessible stall present, but door swing is tight. Needs wider space.",
            &["restroom"],
            1,
            (2025, 10, 3),
        ),
        demo_place(
            "demo-4",
            "Lecture Hall 3",
            PlaceType::Classroom,
            "Academic Block, Hall 3",
            "Step-free entry available via side entrance. No designated parking.",
            &["step_free"],
            2,
            (2025, 7, 15),
        ),
    ]
}

#[test]
fn demo_places_test() {
    let places = places();
    let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();

    assert_eq!(ids, vec!["demo-1", "demo-2", "demo-3", "demo-4"]);
    assert!(places.iter().all(|p| p.is_demo()));
    assert!(places.iter().all(|p| p.created_at.is_some()));
    assert!(places.iter().all(|p| p.reports == 0));
    assert_eq!(places[1].confirmations, 6);
    assert_eq!(places[1].feature_count(), 3);
    assert_eq!(places[1].name, "Main Library \u{2014} North Wing");
    assert_eq!(places[2].name, "Chemistry Building \u{2014} Restroom");
}

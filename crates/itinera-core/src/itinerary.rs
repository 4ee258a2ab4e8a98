//! The slice of the generated itinerary JSON the image pipeline reads.
//!
//! The text-completion service owns the full schema; only activity names and
//! location names are consumed here, everything else is ignored.

use serde::Deserialize;

use crate::place::PlaceQuery;

#[derive(Debug, Clone, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub itinerary: Vec<DayPlan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub activities: Vec<ItineraryActivity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryActivity {
    pub name: String,
    #[serde(default)]
    pub location: Option<ActivityLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityLocation {
    #[serde(default)]
    pub name: Option<String>,
}

impl ItineraryActivity {
    #[must_use]
    pub fn place_query(&self) -> PlaceQuery {
        let query = PlaceQuery::new(self.name.trim());
        match self.location.as_ref().and_then(|l| l.name.as_deref()) {
            Some(locality) => query.with_locality(locality.trim()),
            None => query,
        }
    }
}

impl Itinerary {
    /// One query per activity, in day order. Activities with a blank name are skipped.
    #[must_use]
    pub fn place_queries(&self) -> Vec<PlaceQuery> {
        self.itinerary
            .iter()
            .flat_map(|day| day.activities.iter())
            .filter(|activity| !activity.name.trim().is_empty())
            .map(ItineraryActivity::place_query)
            .collect()
    }
}

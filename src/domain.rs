use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_COUNTRY;

/// A venue/event row as delivered by the snapshot source.
///
/// Field names follow the API shape; the upstream column names of the
/// joined `final_1` view are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "venue_venue_id")]
    pub venue_id: i64,
    #[serde(default, alias = "venue_name_original")]
    pub name: String,
    #[serde(default, alias = "venue_area")]
    pub area: Option<String>,
    #[serde(default, alias = "venue_address")]
    pub address: Option<String>,
    #[serde(default, alias = "venue_country")]
    pub country: Option<String>,
    #[serde(default, alias = "venue_lat")]
    pub lat: Option<f64>,
    #[serde(default, alias = "venue_lng")]
    pub lng: Option<f64>,
    #[serde(default, alias = "venue_phone_number")]
    pub phone: Option<String>,
    #[serde(default, alias = "venue_website")]
    pub website: Option<String>,
    #[serde(default, alias = "venue_category")]
    pub category: Option<String>,
    #[serde(default, alias = "venue_created_at")]
    pub created_at: Option<String>,
    #[serde(default, alias = "venue_final_instagram")]
    pub final_instagram: Option<String>,
    #[serde(default, alias = "event_vibe", deserialize_with = "string_or_seq")]
    pub vibe: Option<Vec<String>>,
    #[serde(default, alias = "event_date")]
    pub date: Option<String>,
    #[serde(default, alias = "music_genre", deserialize_with = "string_or_seq")]
    pub genre: Option<Vec<String>>,
}

impl RawRecord {
    pub fn has_coordinates(&self) -> bool {
        matches!((self.lat, self.lng), (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite())
    }
}

/// The display shape handed back to callers. Event-level fields used only
/// for filtering (vibe, date, genre) are not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub venue_id: i64,
    pub name: String,
    pub area: Option<String>,
    pub address: Option<String>,
    pub country: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub created_at: Option<String>,
    pub final_instagram: Option<String>,
}

impl From<&RawRecord> for Venue {
    fn from(raw: &RawRecord) -> Self {
        Self {
            venue_id: raw.venue_id,
            name: raw.name.clone(),
            area: raw.area.clone(),
            address: raw.address.clone(),
            country: raw
                .country
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            lat: raw.lat,
            lng: raw.lng,
            phone: raw.phone.clone(),
            website: raw.website.clone(),
            category: raw.category.clone(),
            created_at: raw.created_at.clone(),
            final_instagram: raw.final_instagram.clone(),
        }
    }
}

/// Upstream rows carry tag columns either as arrays or as a single compound string.
fn string_or_seq<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<Option<String>>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(value)) => Some(vec![value]),
        Some(OneOrMany::Many(values)) => Some(values.into_iter().flatten().collect()),
    })
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::tools::serialization_tools::{flexible_date_deserializer, flexible_date_serializer};


#[serde_as]
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {

    #[serde(default, alias = "Id")]
    pub id: i32,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Genre")]
    pub genre: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Rating")]
    pub rating: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "ImageUrl")]
    pub image_url: String,

    #[serde(alias = "ReleaseDate")]
    #[serde(serialize_with = "flexible_date_serializer", deserialize_with = "flexible_date_deserializer")]
    pub release_date: DateTime<Utc>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Owner")]
    pub owner: String,
}

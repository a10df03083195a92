//! Catalog models: movies and the reference data they point at

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Genre {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Short reference to a movie, used in back-references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
}

/// Short reference to a director or actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

/// An actor as seen from a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CastMember {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub role: String,
}

/// A movie as seen from an actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActorCredit {
    pub movie: MovieRef,
    pub role: String,
}

/// Movie with genre, director and cast resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub release_year: String,
    pub description: String,
    pub genre: Genre,
    pub director: PersonRef,
    pub actors: Vec<CastMember>,
    pub image_path: Option<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Director {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub birth_year: String,
    pub death_year: Option<String>,
    pub movies: Vec<MovieRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Actor {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub birth_year: String,
    pub death_year: Option<String>,
    pub movies: Vec<ActorCredit>,
}

// ==================== Seed format ====================
//
// Normalised records, one list per collection. References are plain ids and are
// resolved (and checked) when a store is built from the seed.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub directors: Vec<DirectorSeed>,
    #[serde(default)]
    pub actors: Vec<ActorSeed>,
    #[serde(default)]
    pub movies: Vec<MovieSeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectorSeed {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub birth_year: String,
    pub death_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActorSeed {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub birth_year: String,
    pub death_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CastSeed {
    pub actor: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieSeed {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub release_year: String,
    pub description: String,
    pub genre: Uuid,
    pub director: Uuid,
    #[serde(default)]
    pub cast: Vec<CastSeed>,
    pub image_path: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

//! In-memory store for development and tests
//!
//! Users live behind a single `RwLock`; every uniqueness check and the insert that
//! depends on it happen under one write guard with no await in between, which gives
//! the same guarantee as a unique index. The catalog is resolved once from a seed
//! and never changes afterwards.

use super::{CatalogStore, StoreError, UniqueField, UserStore};
use crate::models::{
    catalog::{
        Actor, ActorCredit, CastMember, CatalogSeed, Director, Genre, Movie, MovieRef, PersonRef,
    },
    user::{normalize_email, NewUser, User, UserChanges},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Catalog {
    genres: Vec<Genre>,
    directors: Vec<Director>,
    actors: Vec<Actor>,
    movies: Vec<Movie>,
}

impl Catalog {
    /// Resolve a normalised seed, rejecting dangling references
    fn resolve(seed: CatalogSeed) -> Result<Self, StoreError> {
        let genre_refs: HashMap<Uuid, &Genre> = seed.genres.iter().map(|g| (g.id, g)).collect();
        let director_refs: HashMap<Uuid, PersonRef> = seed
            .directors
            .iter()
            .map(|d| (d.id, PersonRef { id: d.id, name: d.name.clone() }))
            .collect();
        let actor_refs: HashMap<Uuid, PersonRef> = seed
            .actors
            .iter()
            .map(|a| (a.id, PersonRef { id: a.id, name: a.name.clone() }))
            .collect();

        let mut seen = HashSet::new();
        let mut movies = Vec::with_capacity(seed.movies.len());
        for m in &seed.movies {
            if !seen.insert(m.id) {
                return Err(StoreError::Backend(format!("duplicate movie id {}", m.id)));
            }
            let genre = genre_refs.get(&m.genre).ok_or_else(|| {
                StoreError::MissingReference(format!("Genre {} of movie {}", m.genre, m.title))
            })?;
            let director = director_refs.get(&m.director).ok_or_else(|| {
                StoreError::MissingReference(format!("Director {} of movie {}", m.director, m.title))
            })?;
            let actors = m
                .cast
                .iter()
                .map(|c| {
                    actor_refs
                        .get(&c.actor)
                        .map(|a| CastMember { id: a.id, name: a.name.clone(), role: c.role.clone() })
                        .ok_or_else(|| {
                            StoreError::MissingReference(format!(
                                "Actor {} of movie {}",
                                c.actor, m.title
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            movies.push(Movie {
                id: m.id,
                title: m.title.clone(),
                release_year: m.release_year.clone(),
                description: m.description.clone(),
                genre: (*genre).clone(),
                director: director.clone(),
                actors,
                image_path: m.image_path.clone(),
                featured: m.featured,
            });
        }

        // Listing order matches the SQL store
        movies.sort_by(|a, b| a.title.cmp(&b.title));

        // Back-references are derived from the movies, never stored separately
        let mut directors: Vec<Director> = seed
            .directors
            .iter()
            .map(|d| Director {
                id: d.id,
                name: d.name.clone(),
                bio: d.bio.clone(),
                birth_year: d.birth_year.clone(),
                death_year: d.death_year.clone(),
                movies: movies
                    .iter()
                    .filter(|m| m.director.id == d.id)
                    .map(|m| MovieRef { id: m.id, title: m.title.clone() })
                    .collect(),
            })
            .collect();

        let mut actors: Vec<Actor> = seed
            .actors
            .iter()
            .map(|a| Actor {
                id: a.id,
                name: a.name.clone(),
                birth_year: a.birth_year.clone(),
                death_year: a.death_year.clone(),
                movies: movies
                    .iter()
                    .flat_map(|m| {
                        m.actors.iter().filter(|c| c.id == a.id).map(|c| ActorCredit {
                            movie: MovieRef { id: m.id, title: m.title.clone() },
                            role: c.role.clone(),
                        })
                    })
                    .collect(),
            })
            .collect();

        let mut genres = seed.genres;
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        directors.sort_by(|a, b| a.name.cmp(&b.name));
        actors.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            genres,
            directors,
            actors,
            movies,
        })
    }

    fn has_movie(&self, id: Uuid) -> bool {
        self.movies.iter().any(|m| m.id == id)
    }
}

pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    catalog: Catalog,
}

impl MemoryStore {
    /// Empty store with no catalog
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            catalog: Catalog::default(),
        }
    }

    pub fn with_catalog(seed: CatalogSeed) -> Result<Self, StoreError> {
        Ok(Self {
            users: RwLock::new(HashMap::new()),
            catalog: Catalog::resolve(seed)?,
        })
    }

    /// Load the catalog from a JSON seed file
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Backend(format!("failed to read seed {}: {}", path.display(), e))
        })?;
        let seed: CatalogSeed = serde_json::from_str(&raw).map_err(|e| {
            StoreError::Backend(format!("invalid seed {}: {}", path.display(), e))
        })?;

        let store = Self::with_catalog(seed)?;
        tracing::info!(
            path = %path.display(),
            movies = store.catalog.movies.len(),
            "Catalog seed loaded"
        );
        Ok(store)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken(users: &HashMap<String, User>, email: &str, except: Option<&str>) -> bool {
    let email = normalize_email(email);
    users
        .values()
        .any(|u| Some(u.username.as_str()) != except && normalize_email(&u.email) == email)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        if email_taken(&users, &user.email, None) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            email: user.email,
            birthday: user.birthday,
            favorite_movies: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert(record.username.clone(), record.clone());

        Ok(record)
    }

    async fn update_user(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        if !users.contains_key(username) {
            return Ok(None);
        }
        if let Some(new_name) = changes.username.as_deref() {
            if new_name != username && users.contains_key(new_name) {
                return Err(StoreError::Conflict(UniqueField::Username));
            }
        }
        if let Some(email) = changes.email.as_deref() {
            if email_taken(&users, email, Some(username)) {
                return Err(StoreError::Conflict(UniqueField::Email));
            }
        }

        let Some(mut user) = users.remove(username) else {
            return Ok(None);
        };
        if let Some(new_name) = changes.username {
            user.username = new_name;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(birthday) = changes.birthday {
            user.birthday = Some(birthday);
        }
        user.updated_at = Utc::now();
        users.insert(user.username.clone(), user.clone());

        Ok(Some(user))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(username).is_some())
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, StoreError> {
        Ok(email_taken(&*self.users.read().await, email, None))
    }

    async fn add_favorite(
        &self,
        username: &str,
        movie_id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        if !self.catalog.has_movie(movie_id) {
            return Err(StoreError::MissingReference("Movie".to_string()));
        }

        let mut users = self.users.write().await;
        Ok(users.get_mut(username).map(|user| {
            if !user.favorite_movies.contains(&movie_id) {
                user.favorite_movies.push(movie_id);
                user.updated_at = Utc::now();
            }
            user.clone()
        }))
    }

    async fn remove_favorite(
        &self,
        username: &str,
        movie_id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(username).map(|user| {
            let before = user.favorite_movies.len();
            user.favorite_movies.retain(|id| *id != movie_id);
            if user.favorite_movies.len() != before {
                user.updated_at = Utc::now();
            }
            user.clone()
        }))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.catalog.movies.clone())
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        Ok(self.catalog.movies.iter().find(|m| m.title == title).cloned())
    }

    async fn find_movies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Movie>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.catalog.movies.iter().find(|m| m.id == *id).cloned())
            .collect())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError> {
        Ok(self.catalog.genres.clone())
    }

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        Ok(self.catalog.genres.iter().find(|g| g.name == name).cloned())
    }

    async fn list_directors(&self) -> Result<Vec<Director>, StoreError> {
        Ok(self.catalog.directors.clone())
    }

    async fn find_director_by_name(&self, name: &str) -> Result<Option<Director>, StoreError> {
        Ok(self.catalog.directors.iter().find(|d| d.name == name).cloned())
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        Ok(self.catalog.actors.clone())
    }

    async fn find_actor_by_name(&self, name: &str) -> Result<Option<Actor>, StoreError> {
        Ok(self.catalog.actors.iter().find(|a| a.name == name).cloned())
    }
}

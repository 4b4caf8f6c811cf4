use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{keep_or_replace, new_id, replace_if_some, required, Draft, Entity, Patch};
use crate::error::AppError;

/// A supper club listed on the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Filter facet `experience_type` (e.g. `tasting`, `workshop`).
    pub experience_type: String,
    /// Soft reference to the hosting [`Chef`]; resolved client-side.
    #[serde(default)]
    pub host_id: String,
    #[serde(default)]
    pub location: String,
    pub price: f64,
    #[serde(default)]
    pub capacity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    /// Value of a filterable facet, or `None` for facets clubs don't have.
    pub fn facet_value(&self, facet: &str) -> Option<&str> {
        match facet {
            "experience_type" => Some(&self.experience_type),
            "location" => Some(&self.location),
            _ => None,
        }
    }
}

impl Entity for Club {
    const COLLECTION: &'static str = "clubs";
    const LABEL: &'static str = "Club";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClub {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub experience_type: Option<String>,
    pub host_id: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<u32>,
}

impl Draft for NewClub {
    type Entity = Club;

    fn into_entity(self, now: DateTime<Utc>) -> Result<Club, AppError> {
        let price = self
            .price
            .ok_or_else(|| AppError::BadRequest("Missing required field: price".into()))?;
        if price < 0.0 {
            return Err(AppError::BadRequest("price cannot be negative".into()));
        }

        Ok(Club {
            id: new_id(),
            title: required(self.title, "title")?,
            description: required(self.description, "description")?,
            experience_type: required(self.experience_type, "experienceType")?,
            images: self.images.unwrap_or_default(),
            host_id: self.host_id.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            price,
            capacity: self.capacity.unwrap_or(0),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub experience_type: Option<String>,
    pub host_id: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<u32>,
}

impl Patch for ClubPatch {
    type Entity = Club;

    fn apply(self, target: &mut Club, now: DateTime<Utc>) {
        keep_or_replace(&mut target.title, self.title);
        keep_or_replace(&mut target.description, self.description);
        keep_or_replace(&mut target.experience_type, self.experience_type);
        keep_or_replace(&mut target.host_id, self.host_id);
        keep_or_replace(&mut target.location, self.location);
        replace_if_some(&mut target.images, self.images);
        replace_if_some(&mut target.price, self.price.filter(|p| *p >= 0.0));
        replace_if_some(&mut target.capacity, self.capacity);
        target.updated_at = now;
    }
}

/// A chef profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub memberships: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Chef {
    const COLLECTION: &'static str = "chefs";
    const LABEL: &'static str = "Chef";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChef {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub specializations: Option<Vec<String>>,
    pub memberships: Option<Vec<String>>,
    pub is_featured: Option<bool>,
}

impl Draft for NewChef {
    type Entity = Chef;

    fn into_entity(self, now: DateTime<Utc>) -> Result<Chef, AppError> {
        Ok(Chef {
            id: new_id(),
            name: required(self.name, "name")?,
            bio: self.bio.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            specializations: self.specializations.unwrap_or_default(),
            memberships: self.memberships.unwrap_or_default(),
            is_featured: self.is_featured.unwrap_or(false),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChefPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub specializations: Option<Vec<String>>,
    pub memberships: Option<Vec<String>>,
    pub is_featured: Option<bool>,
}

impl Patch for ChefPatch {
    type Entity = Chef;

    fn apply(self, target: &mut Chef, now: DateTime<Utc>) {
        keep_or_replace(&mut target.name, self.name);
        keep_or_replace(&mut target.bio, self.bio);
        keep_or_replace(&mut target.image, self.image);
        replace_if_some(&mut target.specializations, self.specializations);
        replace_if_some(&mut target.memberships, self.memberships);
        replace_if_some(&mut target.is_featured, self.is_featured);
        target.updated_at = now;
    }
}

/// A published recipe, optionally attributed to a chef.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub chef_id: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Recipe {
    const COLLECTION: &'static str = "recipes";
    const LABEL: &'static str = "Recipe";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub chef_id: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
}

impl Draft for NewRecipe {
    type Entity = Recipe;

    fn into_entity(self, now: DateTime<Utc>) -> Result<Recipe, AppError> {
        Ok(Recipe {
            id: new_id(),
            title: required(self.title, "title")?,
            description: self.description.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
            chef_id: self.chef_id.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
            instructions: self.instructions.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub chef_id: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
}

impl Patch for RecipePatch {
    type Entity = Recipe;

    fn apply(self, target: &mut Recipe, now: DateTime<Utc>) {
        keep_or_replace(&mut target.title, self.title);
        keep_or_replace(&mut target.description, self.description);
        keep_or_replace(&mut target.chef_id, self.chef_id);
        keep_or_replace(&mut target.instructions, self.instructions);
        replace_if_some(&mut target.images, self.images);
        replace_if_some(&mut target.ingredients, self.ingredients);
        target.updated_at = now;
    }
}

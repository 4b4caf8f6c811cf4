//! Admin form models. Fields are kept as the strings the inputs hold;
//! list fields are comma-joined and only split when a request is built.

use crate::client::api::ClientError;
use crate::db::catalog::{Chef, ChefPatch, Club, ClubPatch, NewChef, NewClub, NewRecipe, Recipe, RecipePatch};

/// Split a comma-joined input into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_list(values: &[String]) -> String {
    values.join(", ")
}

/// Checkbox/select values: `true`, `yes`, `on` or `1`.
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1"
    )
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_number<T: std::str::FromStr>(raw: &str, field: &str) -> Result<Option<T>, ClientError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| ClientError::Invalid(format!("{field} must be a number"))),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChefForm {
    pub name: String,
    pub bio: String,
    pub image: String,
    pub specializations: String,
    pub memberships: String,
    pub is_featured: String,
}

impl ChefForm {
    pub fn from_chef(chef: &Chef) -> Self {
        Self {
            name: chef.name.clone(),
            bio: chef.bio.clone(),
            image: chef.image.clone(),
            specializations: join_list(&chef.specializations),
            memberships: join_list(&chef.memberships),
            is_featured: chef.is_featured.to_string(),
        }
    }

    pub fn to_draft(&self) -> NewChef {
        NewChef {
            name: non_empty(&self.name),
            bio: non_empty(&self.bio),
            image: non_empty(&self.image),
            specializations: Some(split_list(&self.specializations)),
            memberships: Some(split_list(&self.memberships)),
            is_featured: Some(parse_flag(&self.is_featured)),
        }
    }

    pub fn to_patch(&self) -> ChefPatch {
        let draft = self.to_draft();
        ChefPatch {
            name: draft.name,
            bio: draft.bio,
            image: draft.image,
            specializations: draft.specializations,
            memberships: draft.memberships,
            is_featured: draft.is_featured,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClubForm {
    pub title: String,
    pub description: String,
    pub images: String,
    pub experience_type: String,
    pub host_id: String,
    pub location: String,
    pub price: String,
    pub capacity: String,
}

impl ClubForm {
    pub fn from_club(club: &Club) -> Self {
        Self {
            title: club.title.clone(),
            description: club.description.clone(),
            images: join_list(&club.images),
            experience_type: club.experience_type.clone(),
            host_id: club.host_id.clone(),
            location: club.location.clone(),
            price: club.price.to_string(),
            capacity: club.capacity.to_string(),
        }
    }

    pub fn to_draft(&self) -> Result<NewClub, ClientError> {
        Ok(NewClub {
            title: non_empty(&self.title),
            description: non_empty(&self.description),
            images: Some(split_list(&self.images)),
            experience_type: non_empty(&self.experience_type),
            host_id: non_empty(&self.host_id),
            location: non_empty(&self.location),
            price: parse_number(&self.price, "price")?,
            capacity: parse_number(&self.capacity, "capacity")?,
        })
    }

    pub fn to_patch(&self) -> Result<ClubPatch, ClientError> {
        let draft = self.to_draft()?;
        Ok(ClubPatch {
            title: draft.title,
            description: draft.description,
            images: draft.images,
            experience_type: draft.experience_type,
            host_id: draft.host_id,
            location: draft.location,
            price: draft.price,
            capacity: draft.capacity,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeForm {
    pub title: String,
    pub description: String,
    pub images: String,
    pub chef_id: String,
    pub ingredients: String,
    pub instructions: String,
}

impl RecipeForm {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            images: join_list(&recipe.images),
            chef_id: recipe.chef_id.clone(),
            ingredients: join_list(&recipe.ingredients),
            instructions: recipe.instructions.clone(),
        }
    }

    pub fn to_draft(&self) -> NewRecipe {
        NewRecipe {
            title: non_empty(&self.title),
            description: non_empty(&self.description),
            images: Some(split_list(&self.images)),
            chef_id: non_empty(&self.chef_id),
            ingredients: Some(split_list(&self.ingredients)),
            instructions: non_empty(&self.instructions),
        }
    }

    pub fn to_patch(&self) -> RecipePatch {
        let draft = self.to_draft();
        RecipePatch {
            title: draft.title,
            description: draft.description,
            images: draft.images,
            chef_id: draft.chef_id,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
        }
    }
}

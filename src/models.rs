use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::fmt;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag<'a> {
    pub user_id: Uuid,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Ingredient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub user_id: Uuid,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: BigDecimal,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub time_minutes: i32,
    pub price: BigDecimal,
}

// Attributes and recipes display as their user-facing label
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_tags)]
pub struct NewRecipeTag {
    pub recipe_id: Uuid,
    pub tag_id: Uuid,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
pub struct NewRecipeIngredient {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_tag(name: &str) -> Tag {
        Tag {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tag_displays_as_its_name() {
        assert_eq!(sample_tag("vegan").to_string(), "vegan");
    }

    #[test]
    fn ingredient_displays_as_its_name() {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "cucumber".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(ingredient.to_string(), "cucumber");
    }

    #[test]
    fn recipe_displays_as_its_title() {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "shawarma".to_string(),
            time_minutes: 5,
            price: BigDecimal::from_str("5.00").unwrap(),
            image_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(recipe.to_string(), "shawarma");
    }
}

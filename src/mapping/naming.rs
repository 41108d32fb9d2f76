//! Identifier derivation for generated classes, methods and files.
//!
//! Inflection runs on the lower snake form of a name so irregular plurals
//! are matched regardless of how the table was cased in the schema.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

pub fn singular(word: &str) -> String {
    pluralizer::pluralize(word, 1, false)
}

pub fn plural(word: &str) -> String {
    pluralizer::pluralize(word, 2, false)
}

/// `blog_posts` -> `BlogPost`
pub fn model_name(table: &str) -> String {
    singular(&table.to_snake_case()).to_upper_camel_case()
}

/// The table name the framework infers for a model class: `BlogPost` -> `blog_posts`.
pub fn conventional_table_name(model: &str) -> String {
    plural(&model.to_snake_case()).to_snake_case()
}

/// Accessor for a belongs-to relation targeting `table`: `users` -> `user`.
pub fn belongs_to_method(table: &str) -> String {
    singular(&table.to_snake_case()).to_lower_camel_case()
}

/// Accessor for a has-many relation sourced from `table`: `blog_posts` -> `blogPosts`.
pub fn has_many_method(table: &str) -> String {
    plural(&singular(&table.to_snake_case())).to_lower_camel_case()
}

/// Accessor named after a foreign-key column: `author_id` -> `author`.
pub fn column_relation_method(column: &str) -> String {
    let snake = column.to_snake_case();
    let stem = snake
        .strip_suffix("_id")
        .filter(|s| !s.is_empty())
        .unwrap_or(&snake);
    stem.to_lower_camel_case()
}

/// `create_blog_posts_table`
pub fn migration_name(table: &str) -> String {
    format!("create_{}_table", table.to_snake_case())
}

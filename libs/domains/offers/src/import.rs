//! Tab-separated offer import.
//!
//! One offer per line, 17 columns:
//!
//! ```text
//! name  description  posted_at  city  preview_image  images(;)  is_premium  is_favorite
//! rating  housing_type  room_count  guest_count  price  amenities(;)
//! author(name;email;avatar;user_type)  comment_count  coordinates(lat,long)
//! ```
//!
//! `is_favorite` and `comment_count` are read but ignored. Parsed rows go
//! through the same validation as `POST /offers`.

use domain_users::{NewUser, UserType};
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

use crate::models::{Coordinates, CreateOffer, NewOffer};

pub const COLUMN_COUNT: usize = 17;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("expected {COLUMN_COUNT} columns, found {0}")]
    ColumnCount(usize),

    #[error("column `{column}`: {message}")]
    Column {
        column: &'static str,
        message: String,
    },

    #[error("invalid offer: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("invalid enum value: {0}")]
    Enum(#[from] strum::ParseError),
}

/// One parsed line: the offer and the user that authored it
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedOffer {
    pub offer: NewOffer,
    pub author: NewUser,
}

fn column_error(column: &'static str, message: impl ToString) -> ImportError {
    ImportError::Column {
        column,
        message: message.to_string(),
    }
}

fn parse_number<T: FromStr>(column: &'static str, raw: &str) -> Result<T, ImportError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| column_error(column, e))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_author(raw: &str) -> Result<NewUser, ImportError> {
    let parts: Vec<&str> = raw.split(';').map(str::trim).collect();
    let [name, email, avatar, user_type] = parts[..] else {
        return Err(column_error("author", "expected name;email;avatar;user_type"));
    };

    Ok(NewUser {
        email: email.to_string(),
        name: name.to_string(),
        user_type: UserType::from_str(user_type).map_err(|e| column_error("author", e))?,
        avatar: (!avatar.is_empty()).then(|| avatar.to_string()),
    })
}

fn parse_coordinates(raw: &str) -> Result<Coordinates, ImportError> {
    let (latitude, longitude) = raw
        .split_once(',')
        .ok_or_else(|| column_error("coordinates", "expected lat,long"))?;

    Ok(Coordinates {
        latitude: parse_number("coordinates", latitude)?,
        longitude: parse_number("coordinates", longitude)?,
    })
}

/// Parse one TSV line
pub fn parse_line(line: &str) -> Result<ImportedOffer, ImportError> {
    let columns: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    let [
        name,
        description,
        posted_at,
        city,
        preview_image,
        images,
        is_premium,
        _is_favorite,
        rating,
        housing_type,
        room_count,
        guest_count,
        price,
        amenities,
        author,
        _comment_count,
        coordinates,
    ] = columns[..]
    else {
        return Err(ImportError::ColumnCount(columns.len()));
    };

    let input = CreateOffer {
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        posted_at: posted_at.trim().to_string(),
        city: city.trim().to_string(),
        preview_image: preview_image.trim().to_string(),
        images: split_list(images),
        is_premium: parse_number("is_premium", is_premium)?,
        rating: parse_number("rating", rating)?,
        housing_type: housing_type.trim().to_string(),
        room_count: parse_number("room_count", room_count)?,
        guest_count: parse_number("guest_count", guest_count)?,
        price: parse_number("price", price)?,
        amenities: split_list(amenities),
        coordinates: parse_coordinates(coordinates)?,
    };
    input.validate()?;

    Ok(ImportedOffer {
        offer: input.into_new_offer()?,
        author: parse_author(author)?,
    })
}

/// Parse every non-blank line. Each result carries its 1-based line number.
pub fn parse_lines(content: &str) -> impl Iterator<Item = (usize, Result<ImportedOffer, ImportError>)> + '_ {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, parse_line(line)))
}

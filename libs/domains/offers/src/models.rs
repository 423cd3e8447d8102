use axum_helpers::AssetUrls;
use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString, VariantNames};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Offers returned by `GET /offers` when no limit is given
pub const DEFAULT_OFFER_LIMIT: i64 = 60;

/// Largest `limit` honoured by `GET /offers`
pub const MAX_OFFER_LIMIT: i64 = 100;

/// Offers returned by `GET /offers/premium/{city}`
pub const PREMIUM_OFFER_LIMIT: i64 = 3;

/// City an offer is located in
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
    ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum City {
    Paris,
    Cologne,
    Brussels,
    Amsterdam,
    Hamburg,
    Dusseldorf,
}

/// Kind of accommodation
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HousingType {
    Apartment,
    House,
    Room,
    Hotel,
}

/// Amenities an offer can list
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
    ToSchema,
)]
pub enum Amenity {
    Breakfast,
    #[serde(rename = "Air conditioning")]
    #[strum(serialize = "Air conditioning")]
    AirConditioning,
    #[serde(rename = "Laptop friendly workspace")]
    #[strum(serialize = "Laptop friendly workspace")]
    LaptopFriendlyWorkspace,
    #[serde(rename = "Baby seat")]
    #[strum(serialize = "Baby seat")]
    BabySeat,
    Washer,
    Towels,
    Fridge,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
    pub longitude: f64,
}

/// Offer entity as stored in the `offers` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub posted_at: DateTime<Utc>,
    pub city: City,
    pub preview_image: String,
    pub images: Vec<String>,
    pub is_premium: bool,
    pub rating: f64,
    pub housing_type: HousingType,
    pub room_count: i32,
    pub guest_count: i32,
    pub price: i32,
    pub amenities: Vec<Amenity>,
    pub author_id: ObjectId,
    /// Maintained by comment creation only
    #[serde(default)]
    pub comment_count: i32,
    pub coordinates: Coordinates,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(author_id: ObjectId, input: NewOffer) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name: input.name,
            description: input.description,
            posted_at: input.posted_at,
            city: input.city,
            preview_image: input.preview_image,
            images: input.images,
            is_premium: input.is_premium,
            rating: input.rating,
            housing_type: input.housing_type,
            room_count: input.room_count,
            guest_count: input.guest_count,
            price: input.price,
            amenities: input.amenities,
            author_id,
            comment_count: 0,
            coordinates: input.coordinates,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. The author and comment counter are never touched.
    pub fn apply_patch(&mut self, patch: OfferPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(posted_at) = patch.posted_at {
            self.posted_at = posted_at;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(preview_image) = patch.preview_image {
            self.preview_image = preview_image;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(is_premium) = patch.is_premium {
            self.is_premium = is_premium;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(housing_type) = patch.housing_type {
            self.housing_type = housing_type;
        }
        if let Some(room_count) = patch.room_count {
            self.room_count = room_count;
        }
        if let Some(guest_count) = patch.guest_count {
            self.guest_count = guest_count;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(amenities) = patch.amenities {
            self.amenities = amenities;
        }
        if let Some(coordinates) = patch.coordinates {
            self.coordinates = coordinates;
        }
        self.updated_at = Utc::now();
    }
}

/// Typed, already-validated offer data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOffer {
    pub name: String,
    pub description: String,
    pub posted_at: DateTime<Utc>,
    pub city: City,
    pub preview_image: String,
    pub images: Vec<String>,
    pub is_premium: bool,
    pub rating: f64,
    pub housing_type: HousingType,
    pub room_count: i32,
    pub guest_count: i32,
    pub price: i32,
    pub amenities: Vec<Amenity>,
    pub coordinates: Coordinates,
}

/// Typed partial update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub city: Option<City>,
    pub preview_image: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub rating: Option<f64>,
    pub housing_type: Option<HousingType>,
    pub room_count: Option<i32>,
    pub guest_count: Option<i32>,
    pub price: Option<i32>,
    pub amenities: Option<Vec<Amenity>>,
    pub coordinates: Option<Coordinates>,
}

/// DTO for `POST /offers`
///
/// Enum fields arrive as strings and are checked by custom validators; use
/// [`CreateOffer::into_new_offer`] once `validate()` has passed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOffer {
    #[validate(length(min = 10, max = 100, message = "name must be 10 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 20, max = 1024, message = "description must be 20 to 1024 characters"))]
    pub description: String,
    #[validate(custom(function = "axum_helpers::validation::rfc3339_date"))]
    #[schema(example = "2024-03-01T12:00:00Z")]
    pub posted_at: String,
    #[validate(custom(function = "validate_city"))]
    #[schema(example = "Amsterdam")]
    pub city: String,
    #[validate(length(min = 1, message = "preview_image must not be empty"))]
    pub preview_image: String,
    #[validate(length(min = 1, max = 6, message = "images must contain 1 to 6 entries"))]
    pub images: Vec<String>,
    pub is_premium: bool,
    #[validate(range(min = 1.0, max = 5.0, message = "rating must be 1 to 5"))]
    pub rating: f64,
    #[validate(custom(function = "validate_housing_type"))]
    #[schema(example = "apartment")]
    pub housing_type: String,
    #[validate(range(min = 1, max = 8, message = "room_count must be 1 to 8"))]
    pub room_count: i32,
    #[validate(range(min = 1, max = 10, message = "guest_count must be 1 to 10"))]
    pub guest_count: i32,
    #[validate(range(min = 100, max = 100000, message = "price must be 100 to 100000"))]
    pub price: i32,
    #[validate(custom(function = "validate_amenities"))]
    #[schema(example = json!(["Breakfast", "Washer"]))]
    pub amenities: Vec<String>,
    #[validate(nested)]
    pub coordinates: Coordinates,
}

impl CreateOffer {
    /// Convert the string-typed enum fields. Call only after `validate()` passed.
    pub fn into_new_offer(self) -> Result<NewOffer, strum::ParseError> {
        Ok(NewOffer {
            posted_at: parse_date(&self.posted_at)?,
            city: City::from_str(&self.city)?,
            housing_type: HousingType::from_str(&self.housing_type)?,
            amenities: parse_amenities(&self.amenities)?,
            name: self.name,
            description: self.description,
            preview_image: self.preview_image,
            images: self.images,
            is_premium: self.is_premium,
            rating: self.rating,
            room_count: self.room_count,
            guest_count: self.guest_count,
            price: self.price,
            coordinates: self.coordinates,
        })
    }
}

/// DTO for `PATCH /offers/{offer_id}`; every field is optional.
///
/// There is deliberately no way to set the author or the comment counter.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOffer {
    #[validate(length(min = 10, max = 100, message = "name must be 10 to 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 20, max = 1024, message = "description must be 20 to 1024 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "axum_helpers::validation::rfc3339_date"))]
    pub posted_at: Option<String>,
    #[validate(custom(function = "validate_city"))]
    pub city: Option<String>,
    #[validate(length(min = 1, message = "preview_image must not be empty"))]
    pub preview_image: Option<String>,
    #[validate(length(min = 1, max = 6, message = "images must contain 1 to 6 entries"))]
    pub images: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    #[validate(range(min = 1.0, max = 5.0, message = "rating must be 1 to 5"))]
    pub rating: Option<f64>,
    #[validate(custom(function = "validate_housing_type"))]
    pub housing_type: Option<String>,
    #[validate(range(min = 1, max = 8, message = "room_count must be 1 to 8"))]
    pub room_count: Option<i32>,
    #[validate(range(min = 1, max = 10, message = "guest_count must be 1 to 10"))]
    pub guest_count: Option<i32>,
    #[validate(range(min = 100, max = 100000, message = "price must be 100 to 100000"))]
    pub price: Option<i32>,
    #[validate(custom(function = "validate_amenities"))]
    pub amenities: Option<Vec<String>>,
    #[validate(nested)]
    pub coordinates: Option<Coordinates>,
}

impl UpdateOffer {
    /// Convert into a typed patch. Call only after `validate()` passed.
    pub fn into_patch(self) -> Result<OfferPatch, strum::ParseError> {
        Ok(OfferPatch {
            posted_at: self.posted_at.as_deref().map(parse_date).transpose()?,
            city: self.city.as_deref().map(City::from_str).transpose()?,
            housing_type: self
                .housing_type
                .as_deref()
                .map(HousingType::from_str)
                .transpose()?,
            amenities: self.amenities.as_deref().map(parse_amenities).transpose()?,
            name: self.name,
            description: self.description,
            preview_image: self.preview_image,
            images: self.images,
            is_premium: self.is_premium,
            rating: self.rating,
            room_count: self.room_count,
            guest_count: self.guest_count,
            price: self.price,
            coordinates: self.coordinates,
        })
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, strum::ParseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| strum::ParseError::VariantNotFound)
}

fn parse_amenities(values: &[String]) -> Result<Vec<Amenity>, strum::ParseError> {
    values.iter().map(|v| Amenity::from_str(v)).collect()
}

fn one_of(code: &'static str, allowed: &[&str]) -> ValidationError {
    ValidationError::new(code).with_message(format!("must be one of: {}", allowed.join(", ")).into())
}

fn validate_city(value: &str) -> Result<(), ValidationError> {
    City::from_str(value)
        .map(|_| ())
        .map_err(|_| one_of("city", City::VARIANTS))
}

fn validate_housing_type(value: &str) -> Result<(), ValidationError> {
    HousingType::from_str(value)
        .map(|_| ())
        .map_err(|_| one_of("housing_type", HousingType::VARIANTS))
}

fn validate_amenities(values: &[String]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::new("amenities").with_message("must not be empty".into()));
    }
    if values.iter().any(|v| Amenity::from_str(v).is_err()) {
        return Err(one_of("amenities", Amenity::VARIANTS));
    }
    Ok(())
}

/// Query of `GET /offers`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OfferListQuery {
    /// Maximum number of offers, default 60, capped at 100
    pub limit: Option<i64>,
}

impl OfferListQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l > 0)
            .map_or(DEFAULT_OFFER_LIMIT, |l| l.min(MAX_OFFER_LIMIT))
    }
}

/// Offer as exposed over HTTP, as seen by one viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OfferResponse {
    #[schema(example = "6523f1c4a1b2c3d4e5f60718")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub posted_at: DateTime<Utc>,
    pub city: City,
    /// Absolute URL
    pub preview_image: String,
    /// Absolute URLs
    pub images: Vec<String>,
    pub is_premium: bool,
    /// Whether the viewer has this offer in their favorites
    pub is_favorite: bool,
    pub rating: f64,
    pub housing_type: HousingType,
    pub room_count: i32,
    pub guest_count: i32,
    pub price: i32,
    pub amenities: Vec<Amenity>,
    pub author_id: String,
    pub comment_count: i32,
    pub coordinates: Coordinates,
    pub created_at: DateTime<Utc>,
}

impl OfferResponse {
    pub fn new(offer: &Offer, is_favorite: bool, assets: &AssetUrls) -> Self {
        Self {
            id: offer.id.to_hex(),
            name: offer.name.clone(),
            description: offer.description.clone(),
            posted_at: offer.posted_at,
            city: offer.city,
            preview_image: assets.resolve(&offer.preview_image),
            images: assets.resolve_all(&offer.images),
            is_premium: offer.is_premium,
            is_favorite,
            rating: offer.rating,
            housing_type: offer.housing_type,
            room_count: offer.room_count,
            guest_count: offer.guest_count,
            price: offer.price,
            amenities: offer.amenities.clone(),
            author_id: offer.author_id.to_hex(),
            comment_count: offer.comment_count,
            coordinates: offer.coordinates,
            created_at: offer.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_offer() -> CreateOffer {
        CreateOffer {
            name: "Canal view loft".to_string(),
            description: "Bright loft overlooking the Prinsengracht".to_string(),
            posted_at: "2024-03-01T12:00:00Z".to_string(),
            city: "Amsterdam".to_string(),
            preview_image: "apartment-01.jpg".to_string(),
            images: vec!["apartment-01.jpg".to_string(), "mine.png".to_string()],
            is_premium: true,
            rating: 4.6,
            housing_type: "apartment".to_string(),
            room_count: 2,
            guest_count: 4,
            price: 250,
            amenities: vec!["Breakfast".to_string(), "Air conditioning".to_string()],
            coordinates: Coordinates {
                latitude: 52.370216,
                longitude: 4.895168,
            },
        }
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(City::from_str("paris").unwrap(), City::Paris);
        assert_eq!(City::Dusseldorf.to_string(), "Dusseldorf");
        assert_eq!(HousingType::from_str("hotel").unwrap(), HousingType::Hotel);
        assert_eq!(
            Amenity::from_str("Laptop friendly workspace").unwrap(),
            Amenity::LaptopFriendlyWorkspace
        );
        assert_eq!(
            serde_json::to_value(Amenity::BabySeat).unwrap(),
            serde_json::json!("Baby seat")
        );
        assert!(Amenity::from_str("Sauna").is_err());
    }

    #[test]
    fn test_valid_create_offer_converts() {
        let input = create_offer();
        assert!(input.validate().is_ok());

        let new_offer = input.into_new_offer().unwrap();
        assert_eq!(new_offer.city, City::Amsterdam);
        assert_eq!(new_offer.housing_type, HousingType::Apartment);
        assert_eq!(new_offer.amenities, [Amenity::Breakfast, Amenity::AirConditioning]);
        assert_eq!(new_offer.posted_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn test_name_length_bounds() {
        for (name, ok) in [
            ("x".repeat(9), false),
            ("x".repeat(10), true),
            ("x".repeat(100), true),
            ("x".repeat(101), false),
        ] {
            let mut input = create_offer();
            input.name = name;
            assert_eq!(input.validate().is_ok(), ok);
        }
    }

    #[test]
    fn test_invalid_enums_and_ranges() {
        let mut input = create_offer();
        input.city = "Berlin".to_string();
        input.housing_type = "castle".to_string();
        input.amenities = vec!["Sauna".to_string()];
        input.images = Vec::new();
        input.room_count = 9;
        input.coordinates.latitude = 91.0;

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["city", "housing_type", "amenities", "images", "room_count"] {
            assert!(fields.contains_key(field), "{field} should be rejected");
        }
        assert!(errors.errors().contains_key("coordinates"));
    }

    #[test]
    fn test_empty_amenities_rejected() {
        let mut input = create_offer();
        input.amenities = Vec::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_patch_keeps_counter_and_author() {
        let author = ObjectId::new();
        let mut offer = Offer::new(author, create_offer().into_new_offer().unwrap());
        offer.comment_count = 7;

        let patch = UpdateOffer {
            price: Some(300),
            city: Some("Paris".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
        offer.apply_patch(patch.into_patch().unwrap());

        assert_eq!(offer.price, 300);
        assert_eq!(offer.city, City::Paris);
        assert_eq!(offer.comment_count, 7);
        assert_eq!(offer.author_id, author);
        assert_eq!(offer.name, "Canal view loft");
    }

    #[test]
    fn test_update_offer_validates_present_fields_only() {
        assert!(UpdateOffer::default().validate().is_ok());

        let patch = UpdateOffer {
            name: Some("short".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_response_rewrites_images() {
        let offer = Offer::new(ObjectId::new(), create_offer().into_new_offer().unwrap());
        let assets = AssetUrls::new("http://localhost:8080");

        let response = OfferResponse::new(&offer, true, &assets);
        assert_eq!(response.preview_image, "http://localhost:8080/static/apartment-01.jpg");
        assert_eq!(
            response.images,
            [
                "http://localhost:8080/static/apartment-01.jpg",
                "http://localhost:8080/upload/mine.png"
            ]
        );
        assert!(response.is_favorite);
        assert_eq!(response.comment_count, 0);
    }

    #[test]
    fn test_list_limit_defaults() {
        assert_eq!(OfferListQuery::default().limit(), DEFAULT_OFFER_LIMIT);
        assert_eq!(OfferListQuery { limit: Some(0) }.limit(), DEFAULT_OFFER_LIMIT);
        assert_eq!(OfferListQuery { limit: Some(5) }.limit(), 5);
    }

    #[test]
    fn test_list_limit_is_capped() {
        assert_eq!(OfferListQuery { limit: Some(MAX_OFFER_LIMIT) }.limit(), MAX_OFFER_LIMIT);
        assert_eq!(OfferListQuery { limit: Some(i64::MAX) }.limit(), MAX_OFFER_LIMIT);
    }
}

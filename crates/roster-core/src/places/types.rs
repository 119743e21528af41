// ── Places wire types ──
//
// Shapes exchanged with the maps script's autocomplete widget. Field names
// follow the script's own JSON (snake_case for results, camelCase for
// options).

use serde::{Deserialize, Serialize};

use roster_api::{Address, Geo};

/// Options passed to the autocomplete widget on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_restrictions: Option<ComponentRestrictions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl AutocompleteOptions {
    /// Street-address suggestions restricted to the given countries, asking
    /// only for the fields `PlaceResult::to_address` reads.
    pub fn addresses_in<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut countries: Vec<String> = countries.into_iter().map(Into::into).collect();
        let country = match countries.len() {
            0 => None,
            1 => countries.pop().map(CountryRestriction::One),
            _ => Some(CountryRestriction::Many(countries)),
        };
        Self {
            types: vec!["address".into()],
            component_restrictions: country.map(|country| ComponentRestrictions { country }),
            fields: vec![
                "address_components".into(),
                "formatted_address".into(),
                "geometry".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRestrictions {
    pub country: CountryRestriction,
}

/// One ISO country code or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountryRestriction {
    One(String),
    Many(Vec<String>),
}

impl CountryRestriction {
    pub fn codes(&self) -> &[String] {
        match self {
            Self::One(code) => std::slice::from_ref(code),
            Self::Many(codes) => codes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Geo {
    fn from(location: LatLng) -> Self {
        Geo {
            lat: location.lat.to_string(),
            lng: location.lng.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceGeometry {
    pub location: LatLng,
}

/// A place selected in the widget. Every field is optional because the
/// widget only returns what `AutocompleteOptions::fields` asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_components: Option<Vec<AddressComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<PlaceGeometry>,
}

/// A fully populated place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub address_components: Vec<AddressComponent>,
    pub formatted_address: String,
    pub geometry: PlaceGeometry,
}

impl PlaceResult {
    /// `None` unless components, formatted address and geometry are all present.
    pub fn into_details(self) -> Option<PlaceDetails> {
        Some(PlaceDetails {
            address_components: self.address_components?,
            formatted_address: self.formatted_address?,
            geometry: self.geometry?,
        })
    }

    /// Map the selected place onto a user address.
    pub fn to_address(&self) -> Address {
        address_from(
            self.address_components.as_deref().unwrap_or_default(),
            self.geometry.as_ref(),
        )
    }
}

impl PlaceDetails {
    pub fn to_address(&self) -> Address {
        address_from(&self.address_components, Some(&self.geometry))
    }
}

fn address_from(components: &[AddressComponent], geometry: Option<&PlaceGeometry>) -> Address {
    let find = |kind: &str| {
        components
            .iter()
            .find(|c| c.has_type(kind))
            .map(|c| c.long_name.as_str())
    };

    let street = match (find("street_number"), find("route")) {
        (Some(number), Some(route)) => format!("{number} {route}"),
        (Some(only), None) | (None, Some(only)) => only.to_owned(),
        (None, None) => String::new(),
    };

    Address {
        street,
        suite: find("subpremise").unwrap_or_default().to_owned(),
        city: find("locality")
            .or_else(|| find("postal_town"))
            .unwrap_or_default()
            .to_owned(),
        zipcode: find("postal_code").unwrap_or_default().to_owned(),
        geo: geometry.map(|g| Geo::from(g.location)),
    }
}

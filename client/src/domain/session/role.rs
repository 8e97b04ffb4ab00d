//! Portal roles and role-name normalisation.

use std::fmt;
use std::str::FromStr;

/// A role known to the portal.
///
/// Role names arrive from the remote service in several spellings
/// (`Superadmin`, `TOUR_PACKAGE_VENDOR`, `tour-package-vendor`). They are
/// compared after [`normalize_role_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Bypasses role and ownership checks.
    Superadmin,
    /// Lists accommodation activities.
    AccommodationOwner,
    /// Lists flight activities.
    FlightAirline,
    /// Buys packages and coupons.
    Customer,
    /// Lists insurance activities.
    InsuranceProvider,
    /// Assembles and sells tour packages.
    TourPackageVendor,
    /// Lists vehicle rental activities.
    RentalVendor,
}

impl Role {
    /// Every known role.
    pub const ALL: [Self; 7] = [
        Self::Superadmin,
        Self::AccommodationOwner,
        Self::FlightAirline,
        Self::Customer,
        Self::InsuranceProvider,
        Self::TourPackageVendor,
        Self::RentalVendor,
    ];

    /// Normalised (upper-case, separator-free) name.
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Superadmin => "SUPERADMIN",
            Self::AccommodationOwner => "ACCOMMODATIONOWNER",
            Self::FlightAirline => "FLIGHTAIRLINE",
            Self::Customer => "CUSTOMER",
            Self::InsuranceProvider => "INSURANCEPROVIDER",
            Self::TourPackageVendor => "TOURPACKAGEVENDOR",
            Self::RentalVendor => "RENTALVENDOR",
        }
    }

    /// Parse a raw role name. Unknown names yield `None`.
    ///
    /// # Examples
    /// ```
    /// use client::domain::Role;
    ///
    /// assert_eq!(Role::parse("Tour_Package-Vendor"), Some(Role::TourPackageVendor));
    /// assert_eq!(Role::parse("janitor"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_role_name(raw);
        Self::ALL
            .into_iter()
            .find(|role| role.canonical() == normalized)
    }
}

/// Upper-case a role name and strip `_`, `-` and whitespace.
pub fn normalize_role_name(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, '_' | '-') && !ch.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

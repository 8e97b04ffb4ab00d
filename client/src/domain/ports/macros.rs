//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake_case constructor taking `impl Into<_>` for every
//! field, plus an `is_<variant>` predicate used by adapters and tests.

macro_rules! define_port_error {
    (@methods $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }

            #[doc = concat!("Whether this is [`Self::", stringify!($variant), "`].")]
            pub const fn [<is_ $variant:snake>](&self) -> bool {
                matches!(self, Self::$variant)
            }
        }
    };

    (@methods $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }

            #[doc = concat!("Whether this is [`Self::", stringify!($variant), "`].")]
            pub const fn [<is_ $variant:snake>](&self) -> bool {
                matches!(self, Self::$variant { .. })
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $(
                    #[doc = concat!("The `", stringify!($field), "` detail of this error.")]
                    $field : $ty
                ),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@methods $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum SamplePortError {
            Offline => "offline",
            Refused { message: String } => "refused: {message}",
            Throttled { message: String, retry_after: u32 } =>
                "throttled: {message} ({retry_after}s)",
        }
    }

    #[test]
    fn unit_variants_get_constructors() {
        let err = SamplePortError::offline();
        assert_eq!(err.to_string(), "offline");
        assert!(err.is_offline());
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SamplePortError::refused("nope");
        assert_eq!(err.to_string(), "refused: nope");
        assert!(err.is_refused());
        assert!(!err.is_offline());
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SamplePortError::throttled("slow down", 30_u32);
        assert_eq!(err.to_string(), "throttled: slow down (30s)");
        assert!(err.is_throttled());
    }
}

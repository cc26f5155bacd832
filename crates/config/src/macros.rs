//! The `typed_config!` declaration macro.

/// Declare a config type: the struct, its [`Config`](crate::Config) impl and
/// one typed accessor per key or group.
///
/// Each attribute name doubles as the key name unless the key sets its own
/// with [`Key::key_name`](crate::Key::key_name).
///
/// ```
/// use std::sync::Arc;
/// use typed_config::{Config, DictConfigSource, SharedSource, key, typed_config};
///
/// typed_config! {
///     pub struct Database [section = "database"] {
///         key host: String = key(),
///         key port: u16 = key().parse::<u16>().required(false).default_value(5432),
///     }
/// }
///
/// typed_config! {
///     pub struct App {
///         key name: String = key().section("app"),
///         group database: Database,
///     }
/// }
///
/// let source: SharedSource = Arc::new(
///     DictConfigSource::default()
///         .with_value("app", "name", "demo")
///         .with_value("database", "host", "db.local"),
/// );
/// let app = App::with_sources([source]).unwrap();
/// app.read().unwrap();
/// assert_eq!(app.database().unwrap().port().unwrap(), 5432);
/// ```
///
/// A `[post_read = hook]` tag registers an associated
/// `fn hook(core: &ConfigCore) -> Result<Overrides>` with
/// [`Schema::post_read`](crate::Schema::post_read), so schemas that extend
/// this one inherit it. The generated type also implements `Debug`.
#[macro_export]
macro_rules! typed_config {
    (@schema $schema:expr;) => {
        $schema
    };
    (@schema $schema:expr;
        $(#[$fmeta:meta])* key $field:ident : $ty:ty = $key:expr $(, $($rest:tt)*)?
    ) => {
        $crate::typed_config!(@schema $schema.key::<$ty>(stringify!($field), $key); $($($rest)*)?)
    };
    (@schema $schema:expr;
        $(#[$fmeta:meta])* group $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::typed_config!(@schema $schema.group::<$ty>(stringify!($field)); $($($rest)*)?)
    };

    (@accessors) => {};
    (@accessors
        $(#[$fmeta:meta])* key $field:ident : $ty:ty = $key:expr $(, $($rest:tt)*)?
    ) => {
        $(#[$fmeta])*
        pub fn $field(&self) -> $crate::Result<$ty> {
            self.core.get::<$ty>(stringify!($field))
        }

        $crate::typed_config!(@accessors $($($rest)*)?);
    };
    (@accessors
        $(#[$fmeta:meta])* group $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $(#[$fmeta])*
        pub fn $field(&self) -> $crate::Result<::std::sync::Arc<$ty>> {
            self.core.group::<$ty>(stringify!($field))
        }

        $crate::typed_config!(@accessors $($($rest)*)?);
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $([section = $section:expr])? $([post_read = $hook:ident])? {
            $($body:tt)*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            core: $crate::ConfigCore,
        }

        impl $crate::Config for $name {
            fn schema() -> $crate::Schema {
                let schema = $crate::Schema::new(stringify!($name));
                $(let schema = schema.section($section);)?
                $(let schema = schema.post_read(Self::$hook);)?
                $crate::typed_config!(@schema schema; $($body)*)
            }

            fn from_core(core: $crate::ConfigCore) -> Self {
                Self { core }
            }

            fn core(&self) -> &$crate::ConfigCore {
                &self.core
            }
        }

        impl $name {
            $crate::typed_config!(@accessors $($body)*);
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.core, f)
            }
        }
    };
}

use std::fmt::Display;

use serde::{de::DeserializeOwned, Serialize};

pub trait ConfigKey: Display {
    type Value: Serialize + DeserializeOwned;

    fn fallback() -> Option<Self::Value>;
}

#[macro_export]
macro_rules! key_derive {
    ($key:ident => $value:ty) => {
        impl crate::ConfigKey for $key {
            type Value = $value;

            fn fallback() -> Option<Self::Value> {
                None
            }
        }
    };

    ($key:ident => $value:ty|$fallback:expr) => {
        impl crate::ConfigKey for $key {
            type Value = $value;

            fn fallback() -> Option<Self::Value> {
                Some($fallback)
            }
        }
    };
}

macro_rules! named_key {
    ($key:ident, $name:literal) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $key;

        impl Display for $key {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($name)
            }
        }
    };
}

named_key!(ServiceUrl, "CINELOG_SERVICE_URL");
named_key!(AnonKey, "CINELOG_ANON_KEY");
named_key!(AccessToken, "CINELOG_ACCESS_TOKEN");
named_key!(PostsPerPage, "CINELOG_POSTS_PER_PAGE");
named_key!(TopViewedLimit, "CINELOG_TOP_VIEWED_LIMIT");
named_key!(NewPostRoute, "CINELOG_NEW_POST_ROUTE");
named_key!(MetricsUrl, "CINELOG_METRICS_URL");

key_derive!(ServiceUrl => String);
key_derive!(AnonKey => String);
key_derive!(AccessToken => Option<String> | None);
key_derive!(PostsPerPage => usize | 5);
key_derive!(TopViewedLimit => usize | 10);
key_derive!(NewPostRoute => String | "/posts/new".to_string());
key_derive!(MetricsUrl => Option<String> | None);

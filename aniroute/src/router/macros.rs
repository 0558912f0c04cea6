/// Generate a façade listing method that selects a source, fails over once,
/// and settles to an empty page when every attempt failed.
///
/// Every generated method takes a trailing `source: Option<&str>` preference.
/// The `page:` ident names the page argument; it is clamped to at least 1.
macro_rules! aniroute_router_listing {
    (
        $(#[$meta:meta])*
        method: $name:ident( $( $arg:ident : $arg_ty:ty ),* ),
        capability: $capability:expr,
        page: $page:ident,
        call: $call:ident( $( $call_arg:expr ),* )
    ) => {
        $(#[$meta])*
        #[tracing::instrument(target = "aniroute::router", skip(self))]
        pub async fn $name(
            &self,
            $( $arg: $arg_ty, )*
            source: Option<&str>,
        ) -> aniroute_core::AnimePage {
            let ctx = self.context($capability);
            let $page = $page.max(1);
            let prefer: Vec<&str> = source.into_iter().collect();
            let outcome = self
                .failover(&ctx, &prefer, aniroute_core::AnimePage::is_empty, |s| async move {
                    s.$call($( $call_arg ),*).await
                })
                .await;
            $crate::router::util::settle(&ctx, outcome, || {
                aniroute_core::AnimePage::empty($page, "none")
            })
        }
    };
}

pub(crate) use aniroute_router_listing;

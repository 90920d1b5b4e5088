//! Diesel schema for deployment and provider persistence.

diesel::table! {
    /// Deployment records.
    deployments (id) {
        /// Deployment identifier.
        id -> Uuid,
        /// Catalog resource name.
        #[max_length = 255]
        resource_name -> Varchar,
        /// Catalog resource version.
        #[max_length = 100]
        version -> Varchar,
        /// Resource kind (`mcp`, `agent`).
        #[max_length = 20]
        resource_type -> Varchar,
        /// Target provider identifier.
        #[max_length = 100]
        provider_id -> Varchar,
        /// Lifecycle status (`deploying`, `deployed`, `cancelled`, `failed`).
        #[max_length = 20]
        status -> Varchar,
        /// Origin (`managed`, `discovered`).
        #[max_length = 20]
        origin -> Varchar,
        /// Override map as JSONB.
        config -> Jsonb,
        /// Platform-reported metadata.
        cloud_metadata -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Provider records.
    providers (id) {
        /// Provider identifier.
        #[max_length = 100]
        id -> Varchar,
        /// Human-readable provider name.
        #[max_length = 255]
        name -> Varchar,
        /// Platform key.
        #[max_length = 100]
        platform -> Varchar,
        /// Opaque provider configuration as JSONB.
        config -> Jsonb,
    }
}

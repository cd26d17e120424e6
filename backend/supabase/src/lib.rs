//! Supabase adapters: GoTrue auth as the identity backend, a PostgREST table
//! as the quota ledger.

pub mod auth;
pub mod client;
pub mod profiles;
pub mod wire;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use profiles::ProfileStore;

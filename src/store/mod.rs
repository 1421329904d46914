//! Read-only access to the Supabase data store
//!
//! Agents and their owning profiles live in Postgres and are reached through
//! Supabase's PostgREST interface using the service-role key. This crate never
//! writes to the store.

mod client;

pub use client::{AgentRecord, ProfileRecord, StoreError, SupabaseClient};

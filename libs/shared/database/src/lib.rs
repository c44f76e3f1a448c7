pub mod supabase;

pub use supabase::{RpcError, SupabaseClient};

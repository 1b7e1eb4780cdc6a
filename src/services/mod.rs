// Service modules: the remote data client, local persistence and the
// client-side data generators.

pub mod activity;
pub mod local;
pub mod remote;
pub mod sample;
pub mod supabase;

pub use activity::SimulatedActivity;
pub use local::{LocalStore, MAX_NOTIFICATIONS};
pub use remote::{CounterField, RemoteStore};
pub use supabase::SupabaseClient;

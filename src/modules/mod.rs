pub mod bookings;
pub mod rooms;

use innkeep_kernel::ModuleRegistry;

use crate::store::AppState;

/// Register all project-specific modules with the registry.
///
/// Order matters: migrations run in registration order and bookings
/// reference rooms.
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) {
    registry.register(rooms::create_module(state.clone()));
    registry.register(bookings::create_module(state.clone()));
}

// Endpoint groups for the app-server API.
//
// Each file adds inherent methods to `AppServerClient` for one
// resource family. Transport mechanics stay in `client.rs`.

mod applications;
mod device_profiles;
mod devices;
mod network_servers;
mod organizations;
mod service_profiles;
mod users;

pub mod firebase_store;
pub mod mqtt_transport;

pub use firebase_store::FirebaseStore;
pub use mqtt_transport::MqttTransport;

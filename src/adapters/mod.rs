// Adapters layer: concrete implementations for the external collaborators (chat model, POI service, practitioner directory).

pub mod chat;
pub mod overpass;
pub mod store;

pub use chat::{ChatEndpoint, OpenAiChatClient};
pub use overpass::OverpassClient;
pub use store::InMemoryPractitionerStore;

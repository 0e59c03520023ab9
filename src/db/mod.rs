//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USUARIOS: &str = "usuarios";
    pub const CITAS: &str = "citas";
    pub const CHATS: &str = "chats";
    /// Subcollection of `chats/{chatId}`
    pub const MESSAGES: &str = "messages";
    /// Stripe extension root collection
    pub const CUSTOMERS: &str = "customers";
    /// Subcollection of `customers/{userId}`
    pub const SUBSCRIPTIONS: &str = "subscriptions";
}

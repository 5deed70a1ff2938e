pub mod firestore;
pub mod google_maps;

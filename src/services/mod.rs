// Orbitmarks services
// Stateless helpers shared by the managers and the API layer.

pub mod crypto_service;

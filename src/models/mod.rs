// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Comptes (rôle guest/user/admin, actif/suspendu)
//   - candidature : Candidatures (stage/emploi) d'un utilisateur
//   - service : Services proposés par l'agence
//   - technology : Technologies (tags des réalisations)
//   - realisation : Réalisations du portfolio
//   - realisation_technology : Table de liaison réalisation <-> technologie
//   - article : Articles
//   - temoignage : Témoignages clients
//   - token_blacklist : Refresh tokens révoqués au logout
//
// Points d'attention:
//   - Les politiques ON DELETE sont déclarées sur les relations belongs_to
//     et deviennent des clés étrangères via la migration
//   - auteur_id est toujours SET NULL : supprimer un user ne supprime
//     jamais de contenu
//
// ============================================================================

pub mod health;
pub mod users;
pub mod candidature;
pub mod service;
pub mod technology;
pub mod realisation;
pub mod realisation_technology;
pub mod article;
pub mod temoignage;
pub mod token_blacklist;

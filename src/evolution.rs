use crate::catalog::{CatalogClient, EvolutionNode};
use crate::domain::{EvolutionLink, species_id_from_ref};

/// Longest lineage `flatten` will produce.
pub const MAX_LINEAGE_DEPTH: usize = 16;

/// Walks the chain from the root, following only the first-listed successor
/// of each node. Sibling branches are not part of the lineage.
pub fn flatten(root: &EvolutionNode) -> Vec<EvolutionLink> {
    let mut lineage = Vec::new();
    let mut cursor = Some(root);
    while let Some(node) = cursor {
        if lineage.len() == MAX_LINEAGE_DEPTH {
            tracing::warn!(
                root = %root.species.name,
                depth = MAX_LINEAGE_DEPTH,
                "evolution chain truncated at depth cap"
            );
            break;
        }
        lineage.push(EvolutionLink {
            species_name: node.species.name.clone(),
            species_id: species_id_from_ref(&node.species.url),
        });
        if node.evolves_to.len() > 1 {
            tracing::debug!(
                species = %node.species.name,
                branches = node.evolves_to.len(),
                "following first evolution branch"
            );
        }
        cursor = node.evolves_to.first();
    }
    lineage
}

/// Resolves species → evolution chain → lineage. Any failure along the way
/// yields an empty lineage.
pub async fn fetch_lineage<C>(catalog: &C, species_ref: &str) -> Vec<EvolutionLink>
where
    C: CatalogClient + ?Sized,
{
    let species = match catalog.fetch_species(species_ref).await {
        Ok(species) => species,
        Err(err) => {
            tracing::warn!(species_ref, error = %err, "species fetch failed");
            return Vec::new();
        }
    };
    match catalog
        .fetch_evolution_chain(&species.evolution_chain.url)
        .await
    {
        Ok(root) => flatten(&root),
        Err(err) => {
            tracing::warn!(
                chain_ref = %species.evolution_chain.url,
                error = %err,
                "evolution chain fetch failed"
            );
            Vec::new()
        }
    }
}

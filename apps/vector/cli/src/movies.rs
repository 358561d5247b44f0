//! Sample data set used by `vector-cli seed`

use domain_vector::{VectorDocument, metadata};

pub fn sample_movies() -> Vec<VectorDocument> {
    vec![
        VectorDocument::new(
            "Star Wars",
            "Star Wars: A farm boy joins rebels to fight an evil empire in space",
        )
        .with_metadata(metadata([("genre", "scifi")])),
        VectorDocument::new(
            "Jurassic Park",
            "Jurassic Park: Scientists create dinosaurs in a theme park that goes wrong",
        )
        .with_metadata(metadata([("genre", "scifi")])),
        VectorDocument::new(
            "Finding Nemo",
            "Finding Nemo: A father fish searches the ocean to find his lost son",
        )
        .with_metadata(metadata([("genre", "family")])),
    ]
}

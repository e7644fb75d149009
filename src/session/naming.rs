use async_trait::async_trait;

/// Trait for generating session display names
#[async_trait]
pub trait SessionNameGenerator: Send + Sync {
    async fn generate(&self) -> String;
}

/// Pet name-based session name generator
pub struct PetNameSessionNameGenerator;

impl PetNameSessionNameGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PetNameSessionNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionNameGenerator for PetNameSessionNameGenerator {
    async fn generate(&self) -> String {
        petname::Petnames::default().generate_one(2, "-")
    }
}

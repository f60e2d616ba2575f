use std::path::PathBuf;

pub const FORGE_MAVEN: &str = "https://maven.minecraftforge.net";

/// A Maven coordinate, `group:artifact:version[:classifier]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl MavenArtifact {
    /// `net.minecraftforge:forge:<mc>-<forge>` plus an optional classifier.
    ///
    /// ```
    /// use serverstarter_lib::core::maven::MavenArtifact;
    ///
    /// let installer = MavenArtifact::forge("1.12.2", "14.23.5.2847", Some("installer"));
    /// assert_eq!(installer.filename(), "forge-1.12.2-14.23.5.2847-installer.jar");
    /// ```
    pub fn forge(mc_version: &str, forge_version: &str, classifier: Option<&str>) -> Self {
        Self {
            group_id: "net.minecraftforge".to_string(),
            artifact_id: "forge".to_string(),
            version: forge_id(mc_version, forge_version),
            classifier: classifier.map(str::to_string),
        }
    }

    /// The Forge installer jar for a Minecraft/Forge version pair.
    pub fn forge_installer(mc_version: &str, forge_version: &str) -> Self {
        Self::forge(mc_version, forge_version, Some("installer"))
    }

    /// `artifact-version[-classifier].jar`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}-{}-{}.jar", self.artifact_id, self.version, classifier),
            None => format!("{}-{}.jar", self.artifact_id, self.version),
        }
    }

    /// Folder of this version relative to a repository or `libraries/` root.
    pub fn version_dir(&self) -> PathBuf {
        self.group_id
            .split('.')
            .collect::<PathBuf>()
            .join(&self.artifact_id)
            .join(&self.version)
    }

    /// Download URL in the repository at `repo_base`.
    pub fn url(&self, repo_base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            repo_base.trim_end_matches('/'),
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }
}

/// Forge's combined version id, e.g. `1.12.2-14.23.5.2847`.
///
/// Some packs already carry the Minecraft prefix in the Forge version.
pub fn forge_id(mc_version: &str, forge_version: &str) -> String {
    if forge_version.starts_with(&format!("{}-", mc_version)) {
        forge_version.to_string()
    } else {
        format!("{}-{}", mc_version, forge_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_installer_url() {
        let a = MavenArtifact::forge_installer("1.12.2", "14.23.5.2847");
        assert_eq!(
            a.url(FORGE_MAVEN),
            "https://maven.minecraftforge.net/net/minecraftforge/forge/1.12.2-14.23.5.2847/forge-1.12.2-14.23.5.2847-installer.jar"
        );
    }

    #[test]
    fn forge_id_does_not_duplicate_mc_prefix() {
        assert_eq!(forge_id("1.20.1", "47.2.0"), "1.20.1-47.2.0");
        assert_eq!(forge_id("1.20.1", "1.20.1-47.2.0"), "1.20.1-47.2.0");
    }

    #[test]
    fn version_dir_construction() {
        let a = MavenArtifact::forge("1.20.1", "47.2.0", None);
        assert_eq!(
            a.version_dir(),
            PathBuf::from("net/minecraftforge/forge/1.20.1-47.2.0")
        );
        assert_eq!(a.filename(), "forge-1.20.1-47.2.0.jar");
    }
}

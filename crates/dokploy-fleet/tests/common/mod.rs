use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const STACK: &str = r#"
config:
  dokploy:sshAuthorizedKeys: ssh-ed25519 AAAAC3Nz test@example
  dokploy:compartmentId: ocid1.compartment.oc1..aaaa
  dokploy:sourceImageId: ocid1.image.oc1..bbbb
  dokploy:availabilityDomainMain: kIdk:EU-FRANKFURT-1-AD-1
  dokploy:availabilityDomainWorkers: kIdk:EU-FRANKFURT-1-AD-2
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    /// Project with startup scripts in `bin/` and no stack file yet
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let bin = root.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("dokploy-main.sh"), "#!/bin/bash\necho main\n").unwrap();
        fs::write(bin.join("dokploy-worker.sh"), "#!/bin/bash\necho worker\n").unwrap();
        Self { root }
    }

    pub fn write_stack(&self, content: &str) {
        fs::write(self.root.path().join("fleet.yaml"), content).unwrap();
    }

    /// Stack with `workers` worker nodes
    pub fn with_workers(workers: u32) -> Self {
        let project = Self::new();
        project.write_stack(&format!(
            "{}  dokploy:numWorkerInstances: {}\n",
            STACK, workers
        ));
        project
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    #[allow(dead_code)]
    pub fn write_state(&self, content: &str) {
        let dir = self.root.path().join(".dokploy-fleet");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("state.json"), content).unwrap();
    }
}

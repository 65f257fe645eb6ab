//! Doctor command for environment diagnostics
//!
//! Checks every external dependency the pipeline needs: the Qdrant server,
//! the pdfium library, Tesseract language data, the embedding model cache,
//! and basic disk/memory/permission headroom.

use qdrant_client::client::QdrantClient;
use std::path::Path;
use sysinfo::System;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

/// Doctor diagnostics system
pub struct Doctor {
    qdrant_url: String,
    model_id: String,
    ocr_language: String,
    working_dir: String,
}

impl Doctor {
    pub fn new(
        qdrant_url: String,
        model_id: String,
        ocr_language: String,
        working_dir: String,
    ) -> Self {
        Self {
            qdrant_url,
            model_id,
            ocr_language,
            working_dir,
        }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = Vec::new();

        checks.push(self.check_qdrant().await);
        checks.push(self.check_pdfium());
        checks.push(self.check_tesseract());
        checks.push(self.check_model_cache());
        checks.push(self.check_permissions());
        checks.push(self.check_memory());
        checks.push(self.check_disk_space());

        checks
    }

    /// Check 1: Qdrant reachable
    async fn check_qdrant(&self) -> HealthCheck {
        let client = match QdrantClient::from_url(&self.qdrant_url).build() {
            Ok(client) => client,
            Err(e) => {
                return HealthCheck {
                    name: "Qdrant".to_string(),
                    status: HealthStatus::Fail(format!("Cannot create client: {}", e)),
                }
            }
        };

        match client.list_collections().await {
            Ok(_) => HealthCheck {
                name: "Qdrant".to_string(),
                status: HealthStatus::Pass,
            },
            Err(e) => HealthCheck {
                name: "Qdrant".to_string(),
                status: HealthStatus::Fail(format!(
                    "Not reachable at {}: {}",
                    self.qdrant_url, e
                )),
            },
        }
    }

    /// Check 2: pdfium library binds
    fn check_pdfium(&self) -> HealthCheck {
        match pdfium_render::prelude::Pdfium::bind_to_system_library() {
            Ok(_) => HealthCheck {
                name: "pdfium".to_string(),
                status: HealthStatus::Pass,
            },
            Err(e) => HealthCheck {
                name: "pdfium".to_string(),
                status: HealthStatus::Fail(format!("Library not found: {}", e)),
            },
        }
    }

    /// Check 3: Tesseract language data available
    fn check_tesseract(&self) -> HealthCheck {
        match leptess::LepTess::new(None, &self.ocr_language) {
            Ok(_) => HealthCheck {
                name: "Tesseract".to_string(),
                status: HealthStatus::Pass,
            },
            Err(e) => HealthCheck {
                name: "Tesseract".to_string(),
                // OCR is a fallback: a missing install degrades scanned PDFs
                // only, so this is a warning rather than a failure
                status: HealthStatus::Warn(format!(
                    "OCR unavailable for '{}': {}",
                    self.ocr_language, e
                )),
            },
        }
    }

    /// Check 4: embedding model present in the local cache
    fn check_model_cache(&self) -> HealthCheck {
        let cache = hf_hub::Cache::default();
        let repo = cache.model(self.model_id.clone());

        match repo.get("model.safetensors") {
            Some(_) => HealthCheck {
                name: "Embedding Model".to_string(),
                status: HealthStatus::Pass,
            },
            None => HealthCheck {
                name: "Embedding Model".to_string(),
                status: HealthStatus::Warn(format!(
                    "'{}' not cached yet; it will download on first run",
                    self.model_id
                )),
            },
        }
    }

    /// Check 5: write permission in the working directory
    fn check_permissions(&self) -> HealthCheck {
        let working_path = Path::new(&self.working_dir);

        if !working_path.exists() {
            return HealthCheck {
                name: "Permissions".to_string(),
                status: HealthStatus::Fail("Working directory does not exist".to_string()),
            };
        }

        let test_file = working_path.join(".docsift_test");
        match std::fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_file);
                HealthCheck {
                    name: "Permissions".to_string(),
                    status: HealthStatus::Pass,
                }
            }
            Err(_) => HealthCheck {
                name: "Permissions".to_string(),
                status: HealthStatus::Fail("No write permission in working directory".to_string()),
            },
        }
    }

    /// Check 6: memory availability
    fn check_memory(&self) -> HealthCheck {
        let mut sys = System::new_all();
        sys.refresh_memory();

        let available_gb = sys.available_memory() / (1024 * 1024 * 1024);

        if available_gb < 1 {
            HealthCheck {
                name: "Memory".to_string(),
                status: HealthStatus::Fail(format!(
                    "Less than 1GB RAM available ({} GB)",
                    available_gb
                )),
            }
        } else if available_gb < 2 {
            HealthCheck {
                name: "Memory".to_string(),
                status: HealthStatus::Warn(format!("Low memory ({} GB available)", available_gb)),
            }
        } else {
            HealthCheck {
                name: "Memory".to_string(),
                status: HealthStatus::Pass,
            }
        }
    }

    /// Check 7: disk space
    fn check_disk_space(&self) -> HealthCheck {
        use sysinfo::Disks;
        let disks = Disks::new_with_refreshed_list();

        let working_path = Path::new(&self.working_dir);

        for disk in &disks {
            if working_path.starts_with(disk.mount_point()) {
                let available_gb = disk.available_space() / (1024 * 1024 * 1024);

                return if available_gb < 1 {
                    HealthCheck {
                        name: "Disk Space".to_string(),
                        status: HealthStatus::Fail(format!(
                            "Less than 1GB available ({} GB)",
                            available_gb
                        )),
                    }
                } else if available_gb < 5 {
                    HealthCheck {
                        name: "Disk Space".to_string(),
                        status: HealthStatus::Warn(format!(
                            "Low disk space ({} GB available)",
                            available_gb
                        )),
                    }
                } else {
                    HealthCheck {
                        name: "Disk Space".to_string(),
                        status: HealthStatus::Pass,
                    }
                };
            }
        }

        HealthCheck {
            name: "Disk Space".to_string(),
            status: HealthStatus::Warn("Could not determine disk space".to_string()),
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\ndocsift environment diagnostics\n");
        println!("{:<20} {}", "Check", "Status");
        println!("{}", "=".repeat(50));

        for check in checks {
            let message = match &check.status {
                HealthStatus::Pass => "PASS".to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg),
            };

            println!("{:<20} {}", check.name, message);
        }

        println!();
    }

    /// Overall health: no failed checks
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

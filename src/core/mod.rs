// ─── ServerStarter Core ───
// Installs a modded Forge server from a declarative config and launches it.
//
// Architecture:
//   core/
//     config/       Desired state, `server-setup-config.yaml`
//     lock/         Persisted install record, `serverstarter.lock`
//     connectivity  Fail-fast network probe
//     packs/        Modpack fetchers (curse manifest, server zip)
//     loaders/      Forge server installer + launch entry detection
//     java/         Java binary resolution and version probing
//     bootstrap     SpongeForge bootstrapper
//     files         Additional (remote) and local files
//     downloader/   Streaming downloads with SHA-1 validation
//     orchestrator/ Install decision, step sequence, launch gate
//     launch/       Server command + process runner

pub mod archive;
pub mod bootstrap;
pub mod config;
pub mod connectivity;
pub mod downloader;
pub mod error;
pub mod files;
pub mod http;
pub mod java;
pub mod launch;
pub mod loaders;
pub mod lock;
pub mod logging;
pub mod maven;
pub mod orchestrator;
pub mod packs;

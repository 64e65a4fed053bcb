//! Module scanner: walks a project tree and builds one `ModuleDescriptor`
//! per directory holding a build descriptor.

pub mod descriptor;
pub mod lister;
pub mod scanner;
pub mod types;

pub use descriptor::{DescriptorParser, XmlDescriptorParser};
pub use lister::{DirectoryLister, ListOptions, WalkDirectoryLister};
pub use scanner::{layer_slot, ModuleScanner};
pub use types::{
    ChildModule, DependencySpec, LayerInfo, ModuleDescriptor, ModuleKind, ParentRef,
    ParsedDescriptor, ScanOutcome, SkippedDescriptor,
};

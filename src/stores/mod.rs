// One state container per bounded entity, all following the same shallow
// shape; the settings store is the single cached, de-duplicated read path.

pub mod resource;
pub mod settings;

pub use resource::{AdminResource, ResourceStore, StoreState};
pub use settings::SettingsStore;

use uuid::Uuid;

use crate::models::{
    Blog, Certificate, Exam, Faq, OfflineSession, Product, Report, Term, Ticket, UserAccount,
};

// --- Entity to collection-path bindings ---

impl AdminResource for Term {
    const PATH: &'static str = "/admin/terms";
    const LABEL: &'static str = "term";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for Exam {
    const PATH: &'static str = "/admin/exams";
    const LABEL: &'static str = "exam";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for UserAccount {
    const PATH: &'static str = "/admin/users";
    const LABEL: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for Blog {
    const PATH: &'static str = "/admin/blogs";
    const LABEL: &'static str = "blog post";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for Ticket {
    const PATH: &'static str = "/admin/tickets";
    const LABEL: &'static str = "ticket";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for OfflineSession {
    const PATH: &'static str = "/admin/offline_sessions";
    const LABEL: &'static str = "offline session";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for Report {
    const PATH: &'static str = "/admin/reports";
    const LABEL: &'static str = "report";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for Product {
    const PATH: &'static str = "/admin/products";
    const LABEL: &'static str = "product";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for Certificate {
    const PATH: &'static str = "/admin/certificates";
    const LABEL: &'static str = "certificate";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl AdminResource for Faq {
    const PATH: &'static str = "/admin/faqs";
    const LABEL: &'static str = "faq";

    fn id(&self) -> Uuid {
        self.id
    }
}

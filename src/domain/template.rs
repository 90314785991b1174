//! Built-in deployment presets.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplatePort {
    pub container_port: u16,
    pub host_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefault {
    pub id: &'static str,
    pub image: &'static str,
    /// Canonical port, if the image serves one.
    pub port: Option<TemplatePort>,
    /// Empty means "use the image default".
    pub command: &'static str,
    pub env: &'static [(&'static str, &'static str)],
}

const fn port(container_port: u16, host_port: u16) -> Option<TemplatePort> {
    Some(TemplatePort {
        container_port,
        host_port,
    })
}

static CATALOG: &[TemplateDefault] = &[
    TemplateDefault {
        id: "nginx",
        image: "nginx:latest",
        port: port(80, 8080),
        command: "",
        env: &[],
    },
    TemplateDefault {
        id: "wordpress",
        image: "wordpress:latest",
        port: port(80, 8081),
        command: "",
        env: &[],
    },
    TemplateDefault {
        id: "mysql",
        image: "mysql:5.7",
        port: port(3306, 3306),
        command: "",
        env: &[
            ("MYSQL_ROOT_PASSWORD", "root"),
            ("MYSQL_DATABASE", "mydb"),
            ("MYSQL_USER", "user"),
            ("MYSQL_PASSWORD", "password"),
        ],
    },
    TemplateDefault {
        id: "mongo",
        image: "mongo:latest",
        port: port(27017, 27017),
        command: "",
        env: &[
            ("MONGO_INITDB_ROOT_USERNAME", "root"),
            ("MONGO_INITDB_ROOT_PASSWORD", "example"),
        ],
    },
    TemplateDefault {
        id: "redis",
        image: "redis:latest",
        port: port(6379, 6379),
        command: "",
        env: &[],
    },
    TemplateDefault {
        id: "postgres",
        image: "postgres:15",
        port: port(5432, 5432),
        command: "",
        env: &[
            ("POSTGRES_USER", "user"),
            ("POSTGRES_PASSWORD", "password"),
            ("POSTGRES_DB", "mydb"),
        ],
    },
    TemplateDefault {
        id: "ubuntu",
        image: "ubuntu:latest",
        port: None,
        command: "tail -f /dev/null",
        env: &[],
    },
];

/// Case-insensitive lookup.
pub fn resolve(template_id: &str) -> Option<&'static TemplateDefault> {
    let wanted = template_id.trim();
    CATALOG.iter().find(|t| t.id.eq_ignore_ascii_case(wanted))
}

pub fn list() -> &'static [TemplateDefault] {
    CATALOG
}

//! Embedded deployment templates
//!
//! Templates are rendered with a single flat placeholder→value replace
//! pass; there is deliberately no templating engine.

use crate::github::contents::FileCheckin;

pub const APP_NAME_PLACEHOLDER: &str = "app_name_place_holder";
pub const ACR_PLACEHOLDER: &str = "container_registry_name_place_holder";
pub const CLUSTER_PLACEHOLDER: &str = "cluster_name_place_holder";
pub const RG_PLACEHOLDER: &str = "resource_name_place_holder";
pub const RELEASE_PLACEHOLDER: &str = "release_name_place_holder";
pub const PORT_PLACEHOLDER: &str = "port_number_place_holder";

pub const APP_NAME_DEFAULT: &str = "k8sdemo";
pub const RELEASE_NAME: &str = "pipeupdemo";
pub const PORT_NUMBER_DEFAULT: &str = "8080";

const DEPLOY_WORKFLOW_TEMPLATE: &str = r#"name: CI
on: [push, pull_request]

jobs:
  build:
    runs-on: ubuntu-latest
    steps:
    - uses: actions/checkout@master

    - uses: Azure/docker-login@v1
      with:
        login-server: container_registry_name_place_holder.azurecr.io
        username: ${{ secrets.REGISTRY_USERNAME }}
        password: ${{ secrets.REGISTRY_PASSWORD }}

    - run: |
        docker build . -t container_registry_name_place_holder.azurecr.io/app_name_place_holder:${{ github.sha }}
        docker push container_registry_name_place_holder.azurecr.io/app_name_place_holder:${{ github.sha }}

    - uses: azure/aks-set-context@v1
      with:
        creds: '${{ secrets.AZURE_CREDENTIALS }}'
        cluster-name: cluster_name_place_holder
        resource-group: resource_name_place_holder

    - uses: Azure/k8s-create-secret@v1
      with:
        container-registry-url: container_registry_name_place_holder.azurecr.io
        container-registry-username: ${{ secrets.REGISTRY_USERNAME }}
        container-registry-password: ${{ secrets.REGISTRY_PASSWORD }}
        secret-name: release_name_place_holder-registry

    - uses: Azure/k8s-deploy@v1
      with:
        manifests: |
          manifests/deployment.yml
          manifests/service.yml
        images: |
          container_registry_name_place_holder.azurecr.io/app_name_place_holder:${{ github.sha }}
        imagepullsecrets: |
          release_name_place_holder-registry
"#;

const DEPLOYMENT_MANIFEST_TEMPLATE: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: release_name_place_holder
spec:
  replicas: 1
  selector:
    matchLabels:
      app: release_name_place_holder
  template:
    metadata:
      labels:
        app: release_name_place_holder
    spec:
      containers:
      - name: app_name_place_holder
        image: container_registry_name_place_holder.azurecr.io/app_name_place_holder
        ports:
        - containerPort: port_number_place_holder
"#;

const SERVICE_MANIFEST_TEMPLATE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: release_name_place_holder
spec:
  type: LoadBalancer
  ports:
  - port: 80
    targetPort: port_number_place_holder
  selector:
    app: release_name_place_holder
"#;

const DOCKERFILE_JAVASCRIPT: &str = r#"FROM node:12-alpine
WORKDIR /app
COPY package*.json ./
RUN npm install --production
COPY . .
EXPOSE port_number_place_holder
CMD ["npm", "start"]
"#;

const DOCKERFILE_PYTHON: &str = r#"FROM python:3.8-slim
WORKDIR /app
COPY requirements.txt .
RUN pip install --no-cache-dir -r requirements.txt
COPY . .
EXPOSE port_number_place_holder
CMD ["python", "app.py"]
"#;

const DOCKERFILE_JAVA: &str = r#"FROM maven:3.6-jdk-11 AS build
WORKDIR /app
COPY . .
RUN mvn -q package -DskipTests

FROM openjdk:11-jre-slim
WORKDIR /app
COPY --from=build /app/target/*.jar app.jar
EXPOSE port_number_place_holder
CMD ["java", "-jar", "app.jar"]
"#;

const DOCKER_IGNORE: &str = r#".git
.github
node_modules
__pycache__
target
*.md
"#;

/// Apply a flat placeholder→value map to a template
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |content, (placeholder, value)| {
            content.replace(placeholder, value)
        })
}

/// Render the build-and-deploy workflow for checkin at `path`
pub fn workflow_file(path: &str, registry: &str, cluster: &str, resource_group: &str) -> FileCheckin {
    let content = render(
        DEPLOY_WORKFLOW_TEMPLATE,
        &[
            (APP_NAME_PLACEHOLDER, APP_NAME_DEFAULT),
            (ACR_PLACEHOLDER, registry),
            (CLUSTER_PLACEHOLDER, cluster),
            (RG_PLACEHOLDER, resource_group),
            (RELEASE_PLACEHOLDER, RELEASE_NAME),
        ],
    );
    FileCheckin::new(path, content)
}

/// Render the deployment and service manifests the workflow applies
pub fn manifest_files(registry: &str, port: &str) -> Vec<FileCheckin> {
    let substitutions = [
        (APP_NAME_PLACEHOLDER, APP_NAME_DEFAULT),
        (ACR_PLACEHOLDER, registry),
        (RELEASE_PLACEHOLDER, RELEASE_NAME),
        (PORT_PLACEHOLDER, port),
    ];
    vec![
        FileCheckin::new(
            "manifests/deployment.yml",
            render(DEPLOYMENT_MANIFEST_TEMPLATE, &substitutions),
        ),
        FileCheckin::new(
            "manifests/service.yml",
            render(SERVICE_MANIFEST_TEMPLATE, &substitutions),
        ),
    ]
}

/// Dockerfile and dockerignore pack for a supported language.
/// Returns `None` when the language has no bundled pack.
pub fn docker_files(language: &str, port: &str) -> Option<Vec<FileCheckin>> {
    let dockerfile = match language {
        "JavaScript" => DOCKERFILE_JAVASCRIPT,
        "Python" => DOCKERFILE_PYTHON,
        "Java" => DOCKERFILE_JAVA,
        _ => return None,
    };
    Some(vec![
        FileCheckin::new("Dockerfile", render(dockerfile, &[(PORT_PLACEHOLDER, port)])),
        FileCheckin::new(".dockerignore", DOCKER_IGNORE),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_every_occurrence() {
        let rendered = render("x_place y_place x_place", &[("x_place", "1"), ("y_place", "2")]);
        assert_eq!(rendered, "1 2 1");
    }

    #[test]
    fn test_workflow_file_substitutes_targets() {
        let file = workflow_file(".github/workflows/main.yml", "myacr", "mycluster", "my-rg");
        assert_eq!(file.path, ".github/workflows/main.yml");
        assert!(file.content.contains("login-server: myacr.azurecr.io"));
        assert!(file.content.contains("cluster-name: mycluster"));
        assert!(file.content.contains("resource-group: my-rg"));
        assert!(!file.content.contains("place_holder"));
    }

    #[test]
    fn test_manifests_substitute_port() {
        let files = manifest_files("myacr", "3000");
        assert_eq!(files.len(), 2);
        assert!(files[0].content.contains("containerPort: 3000"));
        assert!(files[1].content.contains("targetPort: 3000"));
    }

    #[test]
    fn test_docker_files_per_language() {
        let files = docker_files("JavaScript", "3000").unwrap();
        assert_eq!(files[0].path, "Dockerfile");
        assert!(files[0].content.contains("EXPOSE 3000"));
        assert_eq!(files[1].path, ".dockerignore");
        assert!(docker_files("Go", "3000").is_none());
    }
}

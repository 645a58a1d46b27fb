//! Fixed reply texts and the structured outcome returned to the webhook.

use serde::Serialize;

use coopnet_locator::{DocumentType, LocatedDocument};

/// System prompt for the assistant fallback.
pub const SYSTEM_PROMPT: &str = "Sos el asistente virtual de la Cooperativa. \
Respondés consultas de socios sobre servicios de internet, cable, tv y \
electricidad, horarios de atención y trámites. Respondé en español, de forma \
breve y cordial. Si no sabés la respuesta, indicá que pueden comunicarse con \
la oficina de atención al socio.";

pub const NEW_SERVICE_REDIRECT: &str = "Para solicitar una nueva conexión o \
instalación, acercate a la oficina de administración de la Cooperativa o \
llamá en horario de atención. ¡Te esperamos!";

pub const ASK_ACCOUNT: &str = "Para buscar tu factura necesito tu número de \
cuenta (figura en cualquier factura anterior). ¿Me lo pasás?";

pub const NOT_FOUND: &str = "No encontré una factura con esos datos. \
Verificá el número de cuenta y el mes, o comunicate con la oficina de \
atención al socio.";

pub const TRANSPORT_APOLOGY: &str = "Disculpá, en este momento no puedo \
acceder a las facturas. Probá de nuevo en unos minutos o comunicate con la \
oficina de atención al socio.";

pub const QUOTA_REACHED: &str = "Ya te enviamos varias facturas este mes. \
Para pedidos adicionales comunicate con la oficina de atención al socio.";

pub fn invoice_delivered(located: &LocatedDocument) -> String {
    let category = match located.doc_type {
        DocumentType::Servicios => "servicios",
        DocumentType::Electricidad => "electricidad",
    };
    format!(
        "¡Listo! Te enviamos tu factura de {} de {}.",
        category, located.period
    )
}

/// Structured outcome of one inbound message.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    NewServiceRedirect {
        text: String,
    },
    InvoiceDelivered {
        text: String,
        file_name: String,
        doc_type: DocumentType,
        delivery_id: String,
    },
    InvoiceNotFound {
        text: String,
    },
    AccountMissing {
        text: String,
    },
    QuotaReached {
        text: String,
    },
    Assistant {
        text: String,
    },
    Apology {
        text: String,
    },
}

impl Reply {
    /// The member-visible text, whatever the outcome.
    pub fn text(&self) -> &str {
        match self {
            Reply::NewServiceRedirect { text }
            | Reply::InvoiceDelivered { text, .. }
            | Reply::InvoiceNotFound { text }
            | Reply::AccountMissing { text }
            | Reply::QuotaReached { text }
            | Reply::Assistant { text }
            | Reply::Apology { text } => text,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Common-expense charge in a resident's breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GastoComunItem {
    pub id: i64,
    pub vivienda_id: i64,
    pub mes: i32,
    pub ano: i32,
    pub monto_total: f64,
    pub estado: Option<String>,
    pub vencimiento: Option<String>,
}

/// Fine in a resident's breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultaItem {
    pub id: i64,
    pub vivienda_id: i64,
    pub monto: f64,
    #[serde(default)]
    pub descripcion: String,
    pub fecha_aplicada: Option<String>,
}

/// Reservation charge in a resident's breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservaItem {
    pub id: i64,
    pub monto_pago: f64,
    pub estado_pago: Option<String>,
    pub inicio: Option<String>,
    pub fin: Option<String>,
}

/// `GET /pagos/residente/{usuario_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentBreakdown {
    #[serde(default)]
    pub viviendas: Vec<i64>,
    #[serde(default)]
    pub cargo_fijo_uf: f64,
    #[serde(default)]
    pub gastos_comunes: Vec<GastoComunItem>,
    #[serde(default)]
    pub multas: Vec<MultaItem>,
    #[serde(default)]
    pub reservas: Vec<ReservaItem>,
}

impl PaymentBreakdown {
    /// Sum of every charge in the breakdown (expenses, fines, reservations).
    pub fn total_due(&self) -> f64 {
        let gastos: f64 = self.gastos_comunes.iter().map(|g| g.monto_total).sum();
        let multas: f64 = self.multas.iter().map(|m| m.monto).sum();
        let reservas: f64 = self.reservas.iter().map(|r| r.monto_pago).sum();
        gastos + multas + reservas
    }
}

/// One row of `GET /pagos/todos`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub id: i64,
    pub usuario_id: i64,
    pub usuario_nombre: String,
    pub vivienda: String,
    pub monto_pagado: f64,
    pub fecha_pago: Option<String>,
    pub metodo_pago: String,
    pub gasto_mes: Option<i32>,
    pub gasto_ano: Option<i32>,
    pub gasto_estado: Option<String>,
}

/// `GET /pagos/todos`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentList {
    pub pagos: Vec<PaymentRecord>,
    pub total: usize,
    pub total_monto: f64,
}

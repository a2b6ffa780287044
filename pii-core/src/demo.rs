//! Textos de demonstração exibidos na página inicial.

/// Pares (título, texto). O primeiro é o texto carregado por padrão.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Solicitud de cliente",
            "El cliente con DNI 98765432K ha solicitado un aumento. Su teléfono es 612345678 y su correo es juan.perez@example.com.",
        ),
        (
            "Datos bancarios",
            "Por favor, haga la transferencia a la cuenta IBAN ES91 2100 0418 4502 0005 1332 a nombre de María García de la Fuente. Para el pago con tarjeta use 4111 1111 1111 1111.",
        ),
        (
            "Incidencia técnica",
            "El Sr. Urquijo reporta accesos sospechosos desde 192.168.1.10 al portal https://intranet.example.es/login desde Valencia.",
        ),
        (
            "Texto seguro",
            "Necesito un resumen de las ventas del último trimestre agrupadas por categoría de producto.",
        ),
    ]
}
